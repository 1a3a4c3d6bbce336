//! Frontend extraction from a TypeScript source tree

use super::{block_at, file_stem, top_level};
use crate::config::ExtractConfig;
use crate::error::Result;
use crate::markers::source_files;
use crate::matcher::UNKNOWN_URL;
use crate::snapshot::{FieldMap, FrontendSnapshot, Service, ServiceMethod};
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::OnceLock;

struct Patterns {
    method: Regex,
    placeholder: Regex,
    interface: Regex,
    object_type: Regex,
    property: Regex,
}

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| {
        let re = |p: &str| Regex::new(p).expect("valid frontend pattern");
        Patterns {
            method: re(r"async\s+(?:function\s+)?(\w+)\s*\([^)]*\)\s*[:{]"),
            placeholder: re(r"\$\{\s*([\w.]+)\s*\}"),
            interface: re(r"export\s+interface\s+(\w+)[^{]*\{"),
            object_type: re(r"export\s+type\s+(\w+)(?:<[^=]*>)?\s*=\s*\{"),
            property: re(r"(?m)^\s*(?:readonly\s+)?(\w+)\??\s*:\s*([^;\n]*)"),
        }
    })
}

/// Call pattern for one HTTP client identifier. Captures the verb, then one
/// of: single-quoted, double-quoted, template literal, bare expression.
fn client_call_pattern(client: &str) -> Result<Regex> {
    Ok(Regex::new(&format!(
        r#"\b{}\s*\.\s*(get|post|put|delete|patch)\s*(?:<[^()]*?>)?\s*\(\s*(?:'([^']*)'|"([^"]*)"|`([^`]*)`|([\w.\[\]]+))"#,
        regex::escape(client)
    ))?)
}

/// Extract a frontend snapshot from a client source root
pub fn extract_frontend(root: &Path, config: &ExtractConfig) -> Result<FrontendSnapshot> {
    let clients = config
        .http_clients
        .iter()
        .map(|c| client_call_pattern(c))
        .collect::<Result<Vec<_>>>()?;
    let extensions = ["ts".to_string()];

    let mut snapshot = FrontendSnapshot::default();

    for path in source_files(&root.join(&config.services_dir), &extensions, &[]) {
        match std::fs::read_to_string(&path) {
            Ok(content) => snapshot.services.push(Service {
                name: file_stem(&path),
                methods: scan_service(&content, &clients),
            }),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable service");
            }
        }
    }

    for path in source_files(&root.join(&config.types_dir), &extensions, &[]) {
        match std::fs::read_to_string(&path) {
            Ok(content) => snapshot.types.extend(scan_types(&content)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable type file");
            }
        }
    }

    tracing::info!(
        services = snapshot.services.len(),
        calls = snapshot.services.iter().map(|s| s.methods.len()).sum::<usize>(),
        types = snapshot.types.len(),
        "extracted frontend snapshot"
    );
    Ok(snapshot)
}

/// HTTP calls made inside each async function of a service module.
///
/// Duplicate `(method, verb, url)` triples are collapsed.
pub fn scan_service(content: &str, clients: &[Regex]) -> Vec<ServiceMethod> {
    let p = patterns();
    let mut seen = HashSet::new();
    let mut methods = Vec::new();

    for caps in p.method.captures_iter(content) {
        let Some(whole) = caps.get(0) else { continue };
        let Some(open) = body_brace(content, whole.start()) else {
            continue;
        };
        let Some(body) = block_at(content, open) else {
            continue;
        };
        let name = &caps[1];

        for client in clients {
            for call in client.captures_iter(body) {
                let verb = call[1].to_string();
                let url = call_url(&call);

                if seen.insert((name.to_string(), verb.clone(), url.clone())) {
                    methods.push(ServiceMethod {
                        name: name.to_string(),
                        verb,
                        url,
                    });
                }
            }
        }
    }

    methods
}

/// First `{` after `from` outside generic angle brackets. Skips `=>` so
/// arrow return types do not unbalance the count.
fn body_brace(content: &str, from: usize) -> Option<usize> {
    let bytes = content.as_bytes();
    let mut angle = 0usize;

    for i in from..bytes.len() {
        match bytes[i] {
            b'<' => angle += 1,
            b'>' if i > 0 && bytes[i - 1] == b'=' => {}
            b'>' => angle = angle.saturating_sub(1),
            b'{' if angle == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

fn call_url(call: &regex::Captures<'_>) -> String {
    let literal = call
        .get(2)
        .or_else(|| call.get(3))
        .or_else(|| call.get(4))
        .map(|m| m.as_str());

    match literal {
        Some(url) => {
            let url = url.split('?').next().unwrap_or(url);
            patterns()
                .placeholder
                .replace_all(url, |c: &regex::Captures<'_>| {
                    let name = c[1].rsplit('.').next().unwrap_or(&c[1]);
                    format!("{{{}}}", name)
                })
                .into_owned()
        }
        None => UNKNOWN_URL.to_string(),
    }
}

/// Exported interfaces and object type aliases with their top-level fields
pub fn scan_types(content: &str) -> BTreeMap<String, FieldMap> {
    let p = patterns();
    let declarations = p
        .interface
        .captures_iter(content)
        .chain(p.object_type.captures_iter(content));

    declarations
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let body = top_level(block_at(content, whole.end() - 1)?);
            let fields: FieldMap = p
                .property
                .captures_iter(&body)
                .map(|prop| {
                    let ty = prop[2].trim().trim_end_matches(',').trim();
                    (prop[1].to_string(), ty.to_string())
                })
                .collect();
            Some((caps[1].to_string(), fields))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SERVICE: &str = r#"
import apiClient from './apiClient'

export const productService = {
  async getAll(filter?: ProductFilter): Promise<Paged<ProductDto>> {
    const { data } = await apiClient.get<Paged<ProductDto>>('/products', { params: filter })
    return data
  },

  async getById(id: string) {
    return apiClient.get(`/products/${id}`)
  },

  async search(term: string): Promise<ProductDto[]> {
    const res = await apiClient.get(`/products/search?q=${term}`)
    const again = await apiClient.get(`/products/search?q=${term}`)
    return res.data
  },

  async save(p: ProductDto) {
    if (p.id) {
      return apiClient.put(`/products/${p.id}`, p)
    }
    return apiClient.post("/products", p)
  },

  async custom(url: string) {
    return apiClient.delete(url)
  },
}
"#;

    fn default_clients() -> Vec<Regex> {
        vec![client_call_pattern("apiClient").unwrap()]
    }

    #[test]
    fn test_scan_service_calls() {
        let methods = scan_service(SERVICE, &default_clients());
        let calls: Vec<_> = methods
            .iter()
            .map(|m| (m.name.as_str(), m.verb.as_str(), m.url.as_str()))
            .collect();

        assert_eq!(
            calls,
            vec![
                ("getAll", "get", "/products"),
                ("getById", "get", "/products/{id}"),
                ("search", "get", "/products/search"),
                ("save", "put", "/products/{id}"),
                ("save", "post", "/products"),
                ("custom", "delete", "Unknown"),
            ]
        );
    }

    #[test]
    fn test_other_clients_are_ignored() {
        let src = "async load() { return http.get('/x') }";
        assert!(scan_service(src, &default_clients()).is_empty());

        let http = vec![client_call_pattern("http").unwrap()];
        assert_eq!(scan_service(src, &http)[0].url, "/x");
    }

    #[test]
    fn test_scan_types() {
        let src = r#"
export interface ProductDto extends BaseDto {
  id: string
  name: string;
  price?: number
  address: {
    street: string
  }
}

export type CreateProductRequest = {
  readonly name: string,
  tags: string[],
}
"#;
        let types = scan_types(src);
        assert_eq!(
            types["ProductDto"].keys().collect::<Vec<_>>(),
            vec!["address", "id", "name", "price"]
        );
        assert_eq!(types["ProductDto"]["address"], "{}");
        assert_eq!(types["ProductDto"]["price"], "number");
        assert_eq!(types["CreateProductRequest"]["tags"], "string[]");
    }

    #[test]
    fn test_extract_frontend_tree() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("services")).unwrap();
        std::fs::create_dir_all(root.join("types")).unwrap();
        std::fs::write(root.join("services/productService.ts"), SERVICE).unwrap();
        std::fs::write(
            root.join("types/product.ts"),
            "export interface ProductDto { id: string }\n",
        )
        .unwrap();

        let snapshot = extract_frontend(root, &ExtractConfig::default()).unwrap();
        assert_eq!(snapshot.services.len(), 1);
        assert_eq!(snapshot.services[0].name, "productService");
        assert_eq!(snapshot.services[0].methods.len(), 6);
        assert_eq!(snapshot.types["ProductDto"]["id"], "string");
    }
}
