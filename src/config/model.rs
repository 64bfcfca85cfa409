// src/config/model.rs

use serde::Deserialize;

use crate::types::{BumpLevel, OverlapPolicy};

/// Top-level configuration as read from `Sitepipe.toml`.
///
/// Every section is optional; the defaults reproduce the conventional
/// `app/` → `dist/` layout:
///
/// ```toml
/// [paths]
/// dist = "./dist/"
/// src = "./app/"
/// js = "js/"
/// css = "css/"
/// templates = "templates/"
///
/// [styles]
/// vendor = ["css/vendor/bootstrap.min.css"]
/// browsers = ["last 2 versions"]
///
/// [watch]
/// on_overlap = "coalesce"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigFile {
    /// Source/destination roots and named sub-paths from `[paths]`.
    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub styles: StylesSection,

    #[serde(default)]
    pub scripts: ScriptsSection,

    #[serde(default)]
    pub images: ImagesSection,

    #[serde(default)]
    pub html: HtmlSection,

    /// `[static]` is a keyword in Rust, hence the rename.
    #[serde(default, rename = "static")]
    pub static_files: StaticSection,

    #[serde(default)]
    pub bump: BumpSection,

    #[serde(default)]
    pub watch: WatchSection,
}

/// `[paths]` section.
///
/// `js`, `css` and `templates` are relative to `src`; `css` and `js` are
/// also reused as sub-directories of `dist`.
#[derive(Debug, Clone, Deserialize)]
pub struct PathConfig {
    #[serde(default = "default_dist")]
    pub dist: String,
    #[serde(default = "default_src")]
    pub src: String,
    #[serde(default = "default_js")]
    pub js: String,
    #[serde(default = "default_css")]
    pub css: String,
    #[serde(default = "default_templates")]
    pub templates: String,
}

fn default_dist() -> String {
    "./dist/".to_string()
}

fn default_src() -> String {
    "./app/".to_string()
}

fn default_js() -> String {
    "js/".to_string()
}

fn default_css() -> String {
    "css/".to_string()
}

fn default_templates() -> String {
    "templates/".to_string()
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            dist: default_dist(),
            src: default_src(),
            js: default_js(),
            css: default_css(),
            templates: default_templates(),
        }
    }
}

/// An external program used as a transformation or lint step.
///
/// Transformations receive the file on stdin and must write the result to
/// stdout. Linters receive the file paths as trailing arguments.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// `[styles]` section: compilation and linting of stylesheets.
#[derive(Debug, Clone, Deserialize)]
pub struct StylesSection {
    /// Name of the concatenated output before the `.min` suffix is applied.
    #[serde(default = "default_style_output")]
    pub output: String,

    /// Stylesheets prepended verbatim, relative to `paths.src`.
    #[serde(default = "default_style_vendor")]
    pub vendor: Vec<String>,

    /// Browserslist queries used for vendor prefixing.
    #[serde(default = "default_browsers")]
    pub browsers: Vec<String>,

    /// External compiler run before prefixing and minification, in place of
    /// the built-in SCSS compiler (grass).
    #[serde(default)]
    pub compiler: Option<CommandSpec>,

    /// External linter; its findings are advisory.
    #[serde(default = "default_linter")]
    pub linter: Option<CommandSpec>,

    /// Lint rule file passed to the linter, relative to the project root.
    #[serde(default = "default_lint_config")]
    pub lint_config: String,
}

fn default_style_output() -> String {
    "style.css".to_string()
}

fn default_style_vendor() -> Vec<String> {
    vec!["css/vendor/bootstrap.min.css".to_string()]
}

fn default_browsers() -> Vec<String> {
    vec!["last 2 versions".to_string()]
}

fn default_linter() -> Option<CommandSpec> {
    Some(CommandSpec::new("scss-lint", &[]))
}

fn default_lint_config() -> String {
    "scss-lint.yml".to_string()
}

impl Default for StylesSection {
    fn default() -> Self {
        Self {
            output: default_style_output(),
            vendor: default_style_vendor(),
            browsers: default_browsers(),
            compiler: None,
            linter: default_linter(),
            lint_config: default_lint_config(),
        }
    }
}

/// `[scripts]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptsSection {
    #[serde(default = "default_script_output")]
    pub output: String,

    /// Scripts prepended in this exact order, relative to `paths.src`.
    #[serde(default = "default_script_vendor")]
    pub vendor: Vec<String>,

    /// External minifier applied to the concatenated bundle (e.g.
    /// `uglifyjs`). Without one the bundle is minified in-process by oxc.
    #[serde(default)]
    pub minifier: Option<CommandSpec>,
}

fn default_script_output() -> String {
    "app.js".to_string()
}

fn default_script_vendor() -> Vec<String> {
    vec![
        "js/vendor/jquery-2.1.4.min.js".to_string(),
        "js/vendor/bootstrap.min.js".to_string(),
    ]
}

impl Default for ScriptsSection {
    fn default() -> Self {
        Self {
            output: default_script_output(),
            vendor: default_script_vendor(),
            minifier: None,
        }
    }
}

/// `[images]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ImagesSection {
    /// Image directory, relative to `paths.src` and mirrored under `paths.dist`.
    #[serde(default = "default_images_dir")]
    pub dir: String,

    #[serde(default = "default_image_extensions")]
    pub extensions: Vec<String>,

    /// External optimizer; replaces the built-in PNG optimizer when set.
    #[serde(default)]
    pub optimizer: Option<CommandSpec>,

    /// oxipng preset (0-6) used by the built-in optimizer.
    #[serde(default = "default_png_level")]
    pub png_level: u8,
}

fn default_images_dir() -> String {
    "images".to_string()
}

fn default_image_extensions() -> Vec<String> {
    ["png", "jpg", "gif", "svg"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_png_level() -> u8 {
    2
}

impl Default for ImagesSection {
    fn default() -> Self {
        Self {
            dir: default_images_dir(),
            extensions: default_image_extensions(),
            optimizer: None,
            png_level: default_png_level(),
        }
    }
}

/// One literal marker substitution performed by the HTML stage.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PartialSpec {
    /// Literal text replaced wherever it occurs, e.g. `<% header %>`.
    pub marker: String,
    /// Partial file, relative to `paths.src` + `paths.templates`.
    pub file: String,
}

impl PartialSpec {
    pub fn new(marker: &str, file: &str) -> Self {
        Self {
            marker: marker.to_string(),
            file: file.to_string(),
        }
    }
}

/// `[html]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct HtmlSection {
    /// Substitutions, applied in this order.
    #[serde(default = "default_partials")]
    pub partials: Vec<PartialSpec>,
}

fn default_partials() -> Vec<PartialSpec> {
    vec![
        PartialSpec::new("<% header %>", "header.html"),
        PartialSpec::new("<% footer %>", "footer.html"),
        PartialSpec::new("<% buttons %>", "button.html"),
    ]
}

impl Default for HtmlSection {
    fn default() -> Self {
        Self {
            partials: default_partials(),
        }
    }
}

/// `[static]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct StaticSection {
    /// Globs relative to `paths.src`, copied verbatim.
    #[serde(default = "default_static_globs")]
    pub globs: Vec<String>,
}

fn default_static_globs() -> Vec<String> {
    vec!["images/**/*".to_string(), "fonts/**/*".to_string()]
}

impl Default for StaticSection {
    fn default() -> Self {
        Self {
            globs: default_static_globs(),
        }
    }
}

/// `[bump]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BumpSection {
    /// Metadata files, relative to the project root.
    #[serde(default = "default_bump_files")]
    pub files: Vec<String>,

    #[serde(default)]
    pub level: BumpLevel,
}

fn default_bump_files() -> Vec<String> {
    vec!["./bower.json".to_string(), "./package.json".to_string()]
}

impl Default for BumpSection {
    fn default() -> Self {
        Self {
            files: default_bump_files(),
            level: BumpLevel::default(),
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    #[serde(default)]
    pub on_overlap: OverlapPolicy,

    /// Quiet period used to fold bursts of filesystem events into one trigger.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    100
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            on_overlap: OverlapPolicy::default(),
            debounce_ms: default_debounce_ms(),
        }
    }
}
