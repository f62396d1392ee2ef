use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use std::path::Path;
use syn::{LitStr, parse_macro_input};

/// 将目录下的所有文件编译进二进制，生成 `lingua::MemorySource`
///
/// 路径相对于调用方 crate 的 `CARGO_MANIFEST_DIR`，文件名使用相对该目录、
/// 以 `/` 分隔的路径，例如 `embed_sources!("assets")` 中的 `assets/ru/ru.xml`
/// 注册为 `ru/ru.xml`。
#[proc_macro]
pub fn embed_sources(input: TokenStream) -> TokenStream {
    let dir = parse_macro_input!(input as LitStr);
    match expand(&dir.value()) {
        Ok(tokens) => tokens.into(),
        Err(msg) => syn::Error::new(dir.span(), msg).to_compile_error().into(),
    }
}

fn expand(dir: &str) -> Result<proc_macro2::TokenStream, String> {
    let manifest_dir =
        std::env::var("CARGO_MANIFEST_DIR").map_err(|e| format!("Failed to get manifest dir: {}", e))?;

    let dir_path = Path::new(&manifest_dir).join(dir);
    if !dir_path.is_dir() {
        return Err(format!("resource directory not found: {}", dir_path.display()));
    }

    let pattern = format!("{}/**/*", dir_path.display());
    let entries = glob::glob(&pattern).map_err(|e| format!("Failed to read glob: {}", e))?;

    let mut inserts = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| format!("Path error: {}", e))?;
        if path.is_dir() {
            continue;
        }

        let name = resource_name(&dir_path, &path)?;

        // include_bytes! 同时让编译器监视文件变更
        let abs_path = path
            .canonicalize()
            .map_err(|e| format!("Failed to resolve {}: {}", path.display(), e))?;
        let abs_path_str = abs_path
            .to_str()
            .ok_or_else(|| format!("Non UTF-8 path: {}", abs_path.display()))?;
        let abs_lit = LitStr::new(abs_path_str, Span::call_site());

        inserts.push(quote! {
            source.insert(#name, include_bytes!(#abs_lit).as_slice());
        });
    }

    Ok(quote! {
        {
            let mut source = ::lingua::MemorySource::new();
            #(#inserts)*
            source
        }
    })
}

fn resource_name(root: &Path, path: &Path) -> Result<String, String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| format!("{} is outside {}", path.display(), root.display()))?;

    let parts = relative
        .components()
        .map(|c| {
            c.as_os_str()
                .to_str()
                .ok_or_else(|| format!("Non UTF-8 path: {}", relative.display()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(parts.join("/"))
}
