//! Backend extraction from an ASP.NET-style C# source tree

use super::{block_at, file_stem, generic_argument};
use crate::config::ExtractConfig;
use crate::error::Result;
use crate::markers::source_files;
use crate::snapshot::{BackendSnapshot, Controller, Endpoint, FieldMap, Implementation, NO_DTO};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

struct Patterns {
    route: Regex,
    endpoint: Regex,
    from_body: Regex,
    from_query: Regex,
    dto: Regex,
    property: Regex,
    interface: Regex,
    task_method: Regex,
    class_with_bases: Regex,
    public_task_method: Regex,
}

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| {
        let re = |p: &str| Regex::new(p).expect("valid backend pattern");
        Patterns {
            route: re(r#"\[Route\("(.+?)"\)\]"#),
            endpoint: re(
                r#"(?s)\[(HttpGet|HttpPost|HttpPut|HttpDelete|HttpPatch)(?:\(\s*"([^"]*)"[^)]*\))?\]\s*(?:\[[^\]]*\]\s*)*public\s+(?:virtual\s+)?(?:async\s+)?([\w<>\[\],.?\s]+?)\s+(\w+)\s*\(([^)]*)\)"#,
            ),
            from_body: re(r"\[FromBody\]\s*([\w<>\[\],.?]+)\s+\w+"),
            from_query: re(r"\[FromQuery\]\s*([\w<>\[\],.?]+)\s+\w+"),
            dto: re(r"public\s+(?:(?:sealed|partial|abstract)\s+)*(?:class|record)\s+(\w+)[^{;]*\{"),
            property: re(r"public\s+(?:required\s+)?([\w<>?\[\],.]+)\s+(\w+)\s*\{\s*get\s*;"),
            interface: re(r"public\s+(?:partial\s+)?interface\s+(\w+)[^{]*\{"),
            task_method: re(r"(?:Task|ValueTask)(?:<[^;(]*>)?\s+(\w+)\s*\("),
            class_with_bases: re(
                r"public\s+(?:(?:sealed|partial|abstract)\s+)*class\s+(\w+)\s*:\s*([^{]+)\{",
            ),
            public_task_method: re(
                r"public\s+(?:override\s+)?(?:virtual\s+)?(?:async\s+)?(?:Task|ValueTask)(?:<[^;{(]*>)?\s+(\w+)\s*\(",
            ),
        }
    })
}

/// Extract a backend snapshot from a server source root
pub fn extract_backend(root: &Path, config: &ExtractConfig) -> Result<BackendSnapshot> {
    let controllers_dir = root.join(&config.controllers_dir);
    let application_dir = root.join(&config.application_dir);

    let extensions = ["cs".to_string()];
    let mut snapshot = BackendSnapshot::default();

    for path in source_files(&controllers_dir, &extensions, &[]) {
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable controller");
                continue;
            }
        };
        snapshot.controllers.push(scan_controller(&file_stem(&path), &content));
    }

    for path in source_files(&application_dir, &extensions, &[]) {
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable source");
                continue;
            }
        };

        let location = path
            .strip_prefix(&application_dir)
            .unwrap_or(&path)
            .to_string_lossy();
        if ["Dto", "Request", "Response", "Model"]
            .iter()
            .any(|marker| location.contains(marker))
        {
            snapshot.dtos.extend(scan_dtos(&content));
        }
        snapshot.interfaces.extend(scan_interfaces(&content));
        snapshot.implementations.extend(scan_implementations(&content));
    }

    tracing::info!(
        controllers = snapshot.controllers.len(),
        dtos = snapshot.dtos.len(),
        interfaces = snapshot.interfaces.len(),
        implementations = snapshot.implementations.len(),
        "extracted backend snapshot"
    );
    Ok(snapshot)
}

/// Endpoints declared in one controller file
pub fn scan_controller(name: &str, content: &str) -> Controller {
    let p = patterns();
    let resource = name.strip_suffix("Controller").unwrap_or(name);

    let base_route = p
        .route
        .captures(content)
        .map(|c| c[1].replace("[controller]", resource))
        .unwrap_or_default();

    let endpoints = p
        .endpoint
        .captures_iter(content)
        .map(|caps| {
            let sub_route = caps.get(2).map_or("", |m| m.as_str());
            let return_type = caps.get(3).map_or("", |m| m.as_str());
            let params = caps.get(5).map_or("", |m| m.as_str());

            Endpoint {
                route: join_route(&base_route, sub_route),
                http_method: caps[1].to_string(),
                method: caps[4].to_string(),
                request_dto: request_dto(params),
                response_dto: response_dto(return_type),
            }
        })
        .collect();

    Controller {
        name: name.to_string(),
        endpoints,
    }
}

/// `/{base}/{sub}` with doubled and trailing slashes removed; an absolute
/// sub-route (`/x` or `~/x`) replaces the base.
fn join_route(base: &str, sub: &str) -> String {
    let joined = if let Some(absolute) = sub.strip_prefix("~/").or_else(|| sub.strip_prefix('/')) {
        format!("/{}", absolute)
    } else {
        format!("/{}/{}", base, sub)
    };

    let mut route = joined;
    while route.contains("//") {
        route = route.replace("//", "/");
    }
    let trimmed = route.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

fn request_dto(params: &str) -> String {
    let p = patterns();
    if let Some(caps) = p.from_body.captures(params) {
        caps[1].to_string()
    } else if let Some(caps) = p.from_query.captures(params) {
        format!("Query:{}", &caps[1])
    } else {
        NO_DTO.to_string()
    }
}

fn response_dto(return_type: &str) -> String {
    const ACTION_RESULT: &str = "ActionResult";

    let mut search = 0;
    while let Some(found) = return_type[search..].find(ACTION_RESULT) {
        let after = search + found + ACTION_RESULT.len();
        if let Some(arg) = generic_argument(return_type, after) {
            return arg.trim().to_string();
        }
        search = after;
    }

    if return_type.contains(ACTION_RESULT) {
        "IActionResult".to_string()
    } else {
        NO_DTO.to_string()
    }
}

/// DTO classes and records with their auto-properties
pub fn scan_dtos(content: &str) -> BTreeMap<String, FieldMap> {
    let p = patterns();
    p.dto
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let body = block_at(content, whole.end() - 1)?;
            let fields: FieldMap = p
                .property
                .captures_iter(body)
                .map(|prop| (prop[2].to_string(), prop[1].to_string()))
                .collect();
            Some((caps[1].to_string(), fields))
        })
        .collect()
}

/// Interfaces with their `Task`-returning method declarations
pub fn scan_interfaces(content: &str) -> BTreeMap<String, Vec<String>> {
    let p = patterns();
    p.interface
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let body = block_at(content, whole.end() - 1)?;
            let methods = p
                .task_method
                .captures_iter(body)
                .map(|m| m[1].to_string())
                .collect();
            Some((caps[1].to_string(), methods))
        })
        .collect()
}

/// Classes with a base list, the interfaces they claim and their public
/// `Task` methods
pub fn scan_implementations(content: &str) -> BTreeMap<String, Implementation> {
    let p = patterns();
    p.class_with_bases
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let body = block_at(content, whole.end() - 1)?;

            let interfaces = split_bases(&caps[2]);
            let methods = p
                .public_task_method
                .captures_iter(body)
                .map(|m| m[1].to_string())
                .collect();

            Some((
                caps[1].to_string(),
                Implementation {
                    interfaces,
                    methods,
                },
            ))
        })
        .collect()
}

/// Split a base list on top-level commas (`IRepo<A, B>, IDisposable`)
fn split_bases(list: &str) -> Vec<String> {
    let mut bases = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();

    for c in list.chars() {
        match c {
            '<' => {
                depth += 1;
                current.push(c);
            }
            '>' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => bases.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    bases.push(current);

    bases
        .into_iter()
        .map(|b| b.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|b| !b.is_empty() && !b.starts_with("where "))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CONTROLLER: &str = r#"
[ApiController]
[Route("api/[controller]")]
public class ProductsController : ControllerBase
{
    [HttpGet]
    public async Task<ActionResult<List<ProductDto>>> GetProducts([FromQuery] ProductFilter filter)
    {
        return Ok();
    }

    [HttpGet("{id:guid}")]
    [ProducesResponseType(200)]
    public async Task<ActionResult<ProductDto>> GetProduct(Guid id)
    {
        return Ok();
    }

    [HttpPost]
    public async Task<IActionResult> Create([FromBody] CreateProductRequest request)
    {
        return Ok();
    }

    [HttpDelete("/api/admin/purge")]
    public IActionResult Purge()
    {
        return Ok();
    }
}
"#;

    #[test]
    fn test_scan_controller() {
        let controller = scan_controller("ProductsController", CONTROLLER);
        let summary: Vec<_> = controller
            .endpoints
            .iter()
            .map(|e| {
                (
                    e.http_method.as_str(),
                    e.route.as_str(),
                    e.method.as_str(),
                    e.request_dto.as_str(),
                    e.response_dto.as_str(),
                )
            })
            .collect();

        assert_eq!(
            summary,
            vec![
                ("HttpGet", "/api/Products", "GetProducts", "Query:ProductFilter", "List<ProductDto>"),
                ("HttpGet", "/api/Products/{id:guid}", "GetProduct", "None", "ProductDto"),
                ("HttpPost", "/api/Products", "Create", "CreateProductRequest", "IActionResult"),
                ("HttpDelete", "/api/admin/purge", "Purge", "None", "IActionResult"),
            ]
        );
    }

    #[test]
    fn test_scan_dtos_reads_every_property() {
        let src = r#"
public class ProductDto
{
    public Guid Id { get; set; }
    public string Name { get; init; } = string.Empty;
    public decimal? Price { get; set; }
}
public record CreateProductRequest
{
    public required string Name { get; init; }
}
"#;
        let dtos = scan_dtos(src);
        assert_eq!(
            dtos["ProductDto"].keys().collect::<Vec<_>>(),
            vec!["Id", "Name", "Price"]
        );
        assert_eq!(dtos["ProductDto"]["Price"], "decimal?");
        assert_eq!(dtos["CreateProductRequest"].len(), 1);
    }

    #[test]
    fn test_scan_interfaces_and_implementations() {
        let src = r#"
public interface IProductService
{
    Task<ProductDto> GetAsync(Guid id);
    Task<List<ProductDto>> ListAsync();
    Task DeleteAsync(Guid id);
}

public class ProductService : IProductService, IDisposable
{
    public async Task<ProductDto> GetAsync(Guid id) { return null; }
    public Task<List<ProductDto>> ListAsync() { return Task.FromResult(new List<ProductDto>()); }
    public void Dispose() { }
}
"#;
        let interfaces = scan_interfaces(src);
        assert_eq!(
            interfaces["IProductService"],
            vec!["GetAsync", "ListAsync", "DeleteAsync"]
        );

        let impls = scan_implementations(src);
        let service = &impls["ProductService"];
        assert_eq!(service.interfaces, vec!["IProductService", "IDisposable"]);
        assert_eq!(service.methods, vec!["GetAsync", "ListAsync"]);
    }

    #[test]
    fn test_split_bases_keeps_generics() {
        assert_eq!(
            split_bases(" Repository<Order, Guid>, IOrderRepository \n"),
            vec!["Repository<Order, Guid>", "IOrderRepository"]
        );
    }

    #[test]
    fn test_join_route() {
        assert_eq!(join_route("api/orders", ""), "/api/orders");
        assert_eq!(join_route("api/orders/", "{id}"), "/api/orders/{id}");
        assert_eq!(join_route("", ""), "/");
        assert_eq!(join_route("api/orders", "~/health"), "/health");
    }

    #[test]
    fn test_extract_backend_tree() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("API/Controllers")).unwrap();
        std::fs::create_dir_all(root.join("Application/Dtos")).unwrap();
        std::fs::write(root.join("API/Controllers/ProductsController.cs"), CONTROLLER).unwrap();
        std::fs::write(
            root.join("Application/Dtos/ProductDto.cs"),
            "public class ProductDto { public Guid Id { get; set; } }",
        )
        .unwrap();

        let snapshot = extract_backend(root, &ExtractConfig::default()).unwrap();
        assert_eq!(snapshot.controllers[0].name, "ProductsController");
        assert_eq!(snapshot.controllers[0].endpoints.len(), 4);
        assert!(snapshot.dtos.contains_key("ProductDto"));
    }
}
