//! Data descriptions of the fenced-block dialects.
//!
//! Each dialect is a static description consumed by the generic
//! [`BlockScanner`](crate::BlockScanner); the class names, id prefixes
//! and `data-*` attribute names below are a frozen contract with the
//! client-side renderers and must not change.

/// Description of one fenced-block dialect.
#[derive(Debug)]
pub struct DialectSpec {
    /// Fence keyword, e.g. `glsl` for ` ```glsl ` blocks.
    pub keyword: &'static str,
    /// CSS class of the emitted placeholder div.
    pub css_class: &'static str,
    /// Prefix for the auto-incrementing DOM id (`<prefix>-<n>`).
    pub id_prefix: &'static str,
    /// The `data-*` attribute carrying the base64 payload.
    pub data_attr: &'static str,
    /// Modifier keywords accepted after the fence keyword, mapped to
    /// the boolean `data-*` attribute they set.
    pub modifiers: &'static [(&'static str, &'static str)],
    /// Whether a `WxH` dimension suffix is accepted after a modifier.
    pub allow_dimensions: bool,
}

/// Mermaid diagram definitions.
pub static MERMAID: DialectSpec = DialectSpec {
    keyword: "mermaid",
    css_class: "mdoc-mermaid",
    id_prefix: "mermaid-diagram",
    data_attr: "data-diagram",
    modifiers: &[("simple", "data-simple-display")],
    allow_dimensions: false,
};

/// GLSL fragment shaders.
pub static GLSL: DialectSpec = DialectSpec {
    keyword: "glsl",
    css_class: "mdoc-glsl-canvas",
    id_prefix: "glsl-container",
    data_attr: "data-fragment-shader",
    modifiers: &[("simple", "data-simple-display"), ("noui", "data-no-ui")],
    allow_dimensions: true,
};

/// Desmos graph configurations.
pub static DESMOS: DialectSpec = DialectSpec {
    keyword: "desmos",
    css_class: "mdoc-desmos-graph",
    id_prefix: "desmos-container",
    data_attr: "data-graph-config",
    modifiers: &[],
    allow_dimensions: false,
};

/// GeoGebra scene configurations.
pub static GEOGEBRA: DialectSpec = DialectSpec {
    keyword: "geogebra",
    css_class: "mdoc-geogebra",
    id_prefix: "geogebra-container",
    data_attr: "data-geogebra-config",
    modifiers: &[],
    allow_dimensions: false,
};

/// p5.js sketch code.
pub static P5JS: DialectSpec = DialectSpec {
    keyword: "p5js",
    css_class: "mdoc-p5js-sketch",
    id_prefix: "p5js-container",
    data_attr: "data-sketch-code",
    modifiers: &[],
    allow_dimensions: false,
};

/// The payload-carrying dialects in their fixed scan order.
pub static BLOCK_DIALECTS: &[&DialectSpec] = &[&MERMAID, &GLSL, &DESMOS, &GEOGEBRA, &P5JS];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_surface_is_stable() {
        // Class/id/attribute names are a wire protocol with client scripts.
        assert_eq!(MERMAID.css_class, "mdoc-mermaid");
        assert_eq!(MERMAID.id_prefix, "mermaid-diagram");
        assert_eq!(GLSL.css_class, "mdoc-glsl-canvas");
        assert_eq!(GLSL.data_attr, "data-fragment-shader");
        assert_eq!(DESMOS.data_attr, "data-graph-config");
        assert_eq!(GEOGEBRA.data_attr, "data-geogebra-config");
        assert_eq!(P5JS.data_attr, "data-sketch-code");
    }

    #[test]
    fn test_scan_order() {
        let keywords: Vec<_> = BLOCK_DIALECTS.iter().map(|d| d.keyword).collect();
        assert_eq!(keywords, ["mermaid", "glsl", "desmos", "geogebra", "p5js"]);
    }

    #[test]
    fn test_only_glsl_takes_dimensions() {
        for dialect in BLOCK_DIALECTS {
            assert_eq!(dialect.allow_dimensions, dialect.keyword == "glsl");
        }
    }
}
