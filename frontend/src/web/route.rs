//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的路由树、每个路由的访问属性，以及路径匹配。

use std::fmt::Display;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// 登录页路径
pub const LOGIN_PATH: &str = "/login";
/// 控制面板路径（已登录用户的默认落点）
pub const DASHBOARD_PATH: &str = "/dashboard";
/// 登录后回跳地址的查询参数名
pub const REDIRECT_QUERY_KEY: &str = "redirect";

/// 路由名称，决定渲染哪个视图
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteName {
    Home,
    Login,
    Register,
    Dashboard,
    Upload,
    Images,
    Profile,
    TestHeaders,
    TestToken,
    AnnotationProjects,
    AnnotationProjectDetail,
    AnnotationLabel,
    AdminUsers,
    AdminAllImages,
    AdminStats,
    AdminCreateProject,
    AdminProjects,
    NotFound,
}

impl RouteName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Login => "Login",
            Self::Register => "Register",
            Self::Dashboard => "Dashboard",
            Self::Upload => "Upload",
            Self::Images => "Images",
            Self::Profile => "Profile",
            Self::TestHeaders => "TestHeaders",
            Self::TestToken => "TestToken",
            Self::AnnotationProjects => "AnnotationProjects",
            Self::AnnotationProjectDetail => "AnnotationProjectDetail",
            Self::AnnotationLabel => "AnnotationLabel",
            Self::AdminUsers => "AdminUsers",
            Self::AdminAllImages => "AdminAllImages",
            Self::AdminStats => "AdminStats",
            Self::AdminCreateProject => "AdminCreateProject",
            Self::AdminProjects => "AdminProjects",
            Self::NotFound => "NotFound",
        }
    }
}

impl Display for RouteName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 路由元信息
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    /// 只有在匹配链上同时存在 `requires_auth` 时才生效
    pub requires_admin: bool,
    /// 仅游客可访问（登录 / 注册）
    pub guest: bool,
    pub title: Option<&'static str>,
}

impl RouteMeta {
    const fn open() -> Self {
        Self {
            requires_auth: false,
            requires_admin: false,
            guest: false,
            title: None,
        }
    }

    const fn guest() -> Self {
        Self {
            guest: true,
            ..Self::open()
        }
    }

    const fn auth(title: Option<&'static str>) -> Self {
        Self {
            requires_auth: true,
            title,
            ..Self::open()
        }
    }

    const fn admin(title: &'static str) -> Self {
        Self {
            requires_auth: true,
            requires_admin: true,
            title: Some(title),
            ..Self::open()
        }
    }
}

/// 路由树节点
#[derive(Debug, PartialEq, Eq)]
pub struct RouteRecord {
    /// 路径模式，子路由为相对路径，`:name` 为参数段
    pub path: &'static str,
    pub name: RouteName,
    pub meta: RouteMeta,
    pub children: &'static [RouteRecord],
}

impl RouteRecord {
    const fn leaf(path: &'static str, name: RouteName, meta: RouteMeta) -> Self {
        Self {
            path,
            name,
            meta,
            children: &[],
        }
    }
}

/// 应用路由表
pub static ROUTES: &[RouteRecord] = &[
    RouteRecord::leaf("/", RouteName::Home, RouteMeta::open()),
    RouteRecord::leaf("/login", RouteName::Login, RouteMeta::guest()),
    RouteRecord::leaf("/register", RouteName::Register, RouteMeta::guest()),
    RouteRecord {
        path: "/dashboard",
        name: RouteName::Dashboard,
        meta: RouteMeta::auth(None),
        children: &[
            RouteRecord::leaf("upload", RouteName::Upload, RouteMeta::open()),
            RouteRecord::leaf("images", RouteName::Images, RouteMeta::open()),
            RouteRecord::leaf("profile", RouteName::Profile, RouteMeta::auth(Some("个人中心"))),
            RouteRecord::leaf(
                "test-headers",
                RouteName::TestHeaders,
                RouteMeta::auth(Some("请求头测试")),
            ),
            RouteRecord::leaf(
                "test-token",
                RouteName::TestToken,
                RouteMeta::auth(Some("Token测试")),
            ),
            // 标注项目
            RouteRecord::leaf(
                "annotation",
                RouteName::AnnotationProjects,
                RouteMeta::auth(Some("标注项目")),
            ),
            RouteRecord::leaf(
                "annotation/project/:id",
                RouteName::AnnotationProjectDetail,
                RouteMeta::auth(Some("项目详情")),
            ),
            RouteRecord::leaf(
                "annotation/label/:projectId/:imageId",
                RouteName::AnnotationLabel,
                RouteMeta::auth(Some("图片标注")),
            ),
            // 管理员
            RouteRecord::leaf("admin/users", RouteName::AdminUsers, RouteMeta::admin("用户管理")),
            RouteRecord::leaf(
                "admin/all-images",
                RouteName::AdminAllImages,
                RouteMeta::admin("所有图片"),
            ),
            RouteRecord::leaf("admin/stats", RouteName::AdminStats, RouteMeta::admin("系统统计")),
            RouteRecord::leaf(
                "admin/create-project",
                RouteName::AdminCreateProject,
                RouteMeta::admin("创建标注项目"),
            ),
            RouteRecord::leaf(
                "admin/projects",
                RouteName::AdminProjects,
                RouteMeta::admin("项目管理"),
            ),
        ],
    },
];

/// 通配路由
pub static NOT_FOUND: RouteRecord =
    RouteRecord::leaf("/:pathMatch(.*)*", RouteName::NotFound, RouteMeta::open());

/// 访问策略，由匹配链上的元信息推导
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    Public,
    Guest,
    Authenticated,
    AdminOnly,
}

impl AccessPolicy {
    pub fn from_chain(chain: &[&RouteRecord]) -> Self {
        let any = |f: fn(&RouteMeta) -> bool| chain.iter().any(|r| f(&r.meta));

        if any(|m| m.requires_auth) {
            if any(|m| m.requires_admin) {
                Self::AdminOnly
            } else {
                Self::Authenticated
            }
        } else if any(|m| m.guest) {
            Self::Guest
        } else {
            Self::Public
        }
    }
}

// =========================================================
// Location
// =========================================================

/// 路径 + 查询参数 + hash
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: Vec<(String, String)>,
    /// 不含 `#`，原样保存
    pub hash: String,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// 登录页，附带回跳地址
    pub fn login_with_redirect(redirect: impl Into<String>) -> Self {
        Self::new(LOGIN_PATH).with_query(REDIRECT_QUERY_KEY, redirect)
    }

    /// 解析 `path?query#hash`
    pub fn parse(full_path: &str) -> Self {
        let (without_hash, hash) = full_path.split_once('#').unwrap_or((full_path, ""));
        let (path, query) = without_hash.split_once('?').unwrap_or((without_hash, ""));

        let query = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((k, v)) => (decode_component(k), decode_component(v)),
                None => (decode_component(pair), String::new()),
            })
            .collect();

        let path = if path.is_empty() { "/" } else { path };
        Self {
            path: path.to_string(),
            query,
            hash: hash.to_string(),
        }
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 完整路径（含查询参数和 hash）
    pub fn full_path(&self) -> String {
        let mut full = self.path.clone();
        if !self.query.is_empty() {
            let query = self
                .query
                .iter()
                .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
                .collect::<Vec<_>>()
                .join("&");
            full.push('?');
            full.push_str(&query);
        }
        if !self.hash.is_empty() {
            full.push('#');
            full.push_str(&self.hash);
        }
        full
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.full_path())
    }
}

/// 查询参数编码集：路径字符（`/`、`:`、`@` 等）保持原样
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/')
    .remove(b':')
    .remove(b'@')
    .remove(b'!')
    .remove(b'$')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b',')
    .remove(b';');

fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, QUERY_COMPONENT).to_string()
}

/// `+` 视为空格（表单编码），`%2B` 仍解码为 `+`
fn decode_component(input: &str) -> String {
    percent_decode_str(&input.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

// =========================================================
// 路由匹配
// =========================================================

/// 匹配结果
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch {
    pub name: RouteName,
    pub params: Vec<(String, String)>,
    /// 从根到叶的匹配链
    pub matched: Vec<&'static RouteRecord>,
    pub location: Location,
}

impl RouteMatch {
    pub fn policy(&self) -> AccessPolicy {
        AccessPolicy::from_chain(&self.matched)
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 显示标题：叶子节点的 title，否则为路由名
    pub fn title(&self) -> &'static str {
        self.matched
            .last()
            .and_then(|r| r.meta.title)
            .unwrap_or_else(|| self.name.as_str())
    }

    pub fn full_path(&self) -> String {
        self.location.full_path()
    }
}

/// 将 Location 匹配到路由表，未命中时落到通配路由
pub fn match_location(location: &Location) -> RouteMatch {
    let segments: Vec<&str> = location.path.split('/').filter(|s| !s.is_empty()).collect();
    let mut chain = Vec::new();
    let mut params = Vec::new();

    if match_records(ROUTES, &segments, &mut chain, &mut params) {
        let name = chain.last().map(|r| r.name).unwrap_or(RouteName::NotFound);
        return RouteMatch {
            name,
            params,
            matched: chain,
            location: location.clone(),
        };
    }

    RouteMatch {
        name: RouteName::NotFound,
        params: vec![("pathMatch".to_string(), location.path.clone())],
        matched: vec![&NOT_FOUND],
        location: location.clone(),
    }
}

/// 按路径字符串匹配
pub fn match_path(full_path: &str) -> RouteMatch {
    match_location(&Location::parse(full_path))
}

fn match_records(
    records: &'static [RouteRecord],
    segments: &[&str],
    chain: &mut Vec<&'static RouteRecord>,
    params: &mut Vec<(String, String)>,
) -> bool {
    for record in records {
        let pattern: Vec<&str> = record.path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.len() < pattern.len() {
            continue;
        }
        let Some(bound) = bind_segments(&pattern, &segments[..pattern.len()]) else {
            continue;
        };

        let rest = &segments[pattern.len()..];
        if rest.is_empty() {
            chain.push(record);
            params.extend(bound);
            return true;
        }

        if !record.children.is_empty() {
            let mut child_chain = Vec::new();
            let mut child_params = Vec::new();
            if match_records(record.children, rest, &mut child_chain, &mut child_params) {
                chain.push(record);
                chain.extend(child_chain);
                params.extend(bound);
                params.extend(child_params);
                return true;
            }
        }
    }
    false
}

fn bind_segments(pattern: &[&str], segments: &[&str]) -> Option<Vec<(String, String)>> {
    let mut bound = Vec::new();
    for (p, s) in pattern.iter().zip(segments) {
        if let Some(name) = p.strip_prefix(':') {
            bound.push((name.to_string(), decode_component(s)));
        } else if !p.eq_ignore_ascii_case(s) {
            return None;
        }
    }
    Some(bound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_level_routes() {
        assert_eq!(match_path("/").name, RouteName::Home);
        assert_eq!(match_path("/login").policy(), AccessPolicy::Guest);
        assert_eq!(match_path("/register").policy(), AccessPolicy::Guest);
        assert_eq!(match_path("/dashboard").policy(), AccessPolicy::Authenticated);
        assert_eq!(match_path("/dashboard/").name, RouteName::Dashboard);
    }

    #[test]
    fn children_inherit_auth_from_dashboard() {
        let upload = match_path("/dashboard/upload");
        assert_eq!(upload.name, RouteName::Upload);
        assert_eq!(upload.matched.len(), 2);
        assert!(!upload.matched[1].meta.requires_auth);
        assert_eq!(upload.policy(), AccessPolicy::Authenticated);
        assert_eq!(upload.title(), "Upload");
    }

    #[test]
    fn admin_routes_are_admin_only() {
        for path in [
            "/dashboard/admin/users",
            "/dashboard/admin/all-images",
            "/dashboard/admin/stats",
            "/dashboard/admin/create-project",
            "/dashboard/admin/projects",
        ] {
            assert_eq!(match_path(path).policy(), AccessPolicy::AdminOnly, "{}", path);
        }
        assert_eq!(match_path("/dashboard/admin/users").title(), "用户管理");
    }

    #[test]
    fn params_are_bound() {
        let detail = match_path("/dashboard/annotation/project/42");
        assert_eq!(detail.name, RouteName::AnnotationProjectDetail);
        assert_eq!(detail.param("id"), Some("42"));

        let label = match_path("/dashboard/annotation/label/3/17?zoom=2");
        assert_eq!(label.name, RouteName::AnnotationLabel);
        assert_eq!(label.param("projectId"), Some("3"));
        assert_eq!(label.param("imageId"), Some("17"));
        assert_eq!(label.location.query_value("zoom"), Some("2"));
    }

    #[test]
    fn unknown_paths_fall_through_to_not_found() {
        for path in ["/nope", "/dashboard/unknown", "/login/extra", "/dashboard/annotation/project"] {
            let m = match_path(path);
            assert_eq!(m.name, RouteName::NotFound, "{}", path);
            assert_eq!(m.policy(), AccessPolicy::Public);
        }
    }

    #[test]
    fn requires_admin_without_auth_is_public() {
        static LOOSE: RouteRecord = RouteRecord::leaf(
            "/loose",
            RouteName::AdminStats,
            RouteMeta {
                requires_admin: true,
                ..RouteMeta::open()
            },
        );
        assert_eq!(AccessPolicy::from_chain(&[&LOOSE]), AccessPolicy::Public);
    }

    #[test]
    fn location_round_trips_redirect_query() {
        let login = Location::login_with_redirect("/dashboard/upload");
        assert_eq!(login.full_path(), "/login?redirect=/dashboard/upload");

        let nested = Location::login_with_redirect("/dashboard/images?page=2&size=10");
        let encoded = nested.full_path();
        assert_eq!(encoded, "/login?redirect=/dashboard/images%3Fpage%3D2%26size%3D10");
        assert_eq!(
            Location::parse(&encoded).query_value(REDIRECT_QUERY_KEY),
            Some("/dashboard/images?page=2&size=10")
        );
    }

    #[test]
    fn parse_handles_hash_and_bare_keys() {
        let loc = Location::parse("/dashboard/images?flag&name=%E5%9B%BE#top");
        assert_eq!(loc.path, "/dashboard/images");
        assert_eq!(loc.query_value("flag"), Some(""));
        assert_eq!(loc.query_value("name"), Some("图"));
        assert_eq!(loc.hash, "top");
        assert_eq!(Location::parse("").path, "/");
    }

    #[test]
    fn codec_handles_plus_and_non_ascii() {
        let loc = Location::new("/search")
            .with_query("q", "a+b c")
            .with_query("tag", "猫");
        let encoded = loc.full_path();
        assert_eq!(encoded, "/search?q=a%2Bb%20c&tag=%E7%8C%AB");
        let parsed = Location::parse(&encoded);
        assert_eq!(parsed.query_value("q"), Some("a+b c"));
        assert_eq!(parsed.query_value("tag"), Some("猫"));
        assert_eq!(Location::parse("/s?q=a+b").query_value("q"), Some("a b"));
        // 非法转义原样保留
        assert_eq!(Location::parse("/s?q=100%").query_value("q"), Some("100%"));
    }

    #[test]
    fn hash_survives_redirect_round_trip() {
        let target = Location::parse("/dashboard/images?page=2#item-7");
        assert_eq!(target.full_path(), "/dashboard/images?page=2#item-7");

        let login = Location::login_with_redirect(target.full_path());
        let encoded = login.full_path();
        assert_eq!(encoded, "/login?redirect=/dashboard/images%3Fpage%3D2%23item-7");
        assert_eq!(
            Location::parse(&encoded).query_value(REDIRECT_QUERY_KEY),
            Some("/dashboard/images?page=2#item-7")
        );
    }

    #[test]
    fn static_segments_match_case_insensitively() {
        let upload = match_path("/Dashboard/Upload");
        assert_eq!(upload.name, RouteName::Upload);
        assert_eq!(upload.policy(), AccessPolicy::Authenticated);
        assert_eq!(match_path("/ADMIN").name, RouteName::NotFound);

        // 参数值保持原始大小写
        let detail = match_path("/dashboard/Annotation/Project/AbC");
        assert_eq!(detail.param("id"), Some("AbC"));
    }
}
