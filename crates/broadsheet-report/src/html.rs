//! Page shells shared by every artifact.

use serde_json::Value;

const ASSETS: &str = "https://go-echarts.github.io/go-echarts-assets/assets";

pub const ECHARTS: &str = "echarts.min.js";
pub const LIQUIDFILL: &str = "echarts-liquidfill.min.js";
pub const WORDCLOUD: &str = "echarts-wordcloud.min.js";

/// Escape text for use in element content and quoted attributes.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

const TEXT_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>__TITLE__</title>
<style>
body{font-family:Arial,sans-serif;margin:0;color:#333}
__STYLE__
</style>
</head>
<body>
__BODY__
</body>
</html>
"#;

/// Plain HTML page. `title` is escaped, `style` and `body` are inserted as-is.
pub fn text_page(title: &str, style: &str, body: &str) -> String {
    TEXT_PAGE
        .replace("__TITLE__", &escape(title))
        .replace("__STYLE__", style)
        .replace("__BODY__", body)
}

const CHART_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>__TITLE__</title>
__SCRIPTS__
<style>
html,body{margin:0;height:100%;font-family:Arial,sans-serif}
#chart{width:100%;height:100%;min-height:380px}
</style>
</head>
<body>
<div id="chart"></div>
<script type="text/javascript">
"use strict";
var chart = echarts.init(document.getElementById("chart"), "white", {renderer: "canvas"});
var option = __OPTION__;
chart.setOption(option);
window.addEventListener("resize", function () { chart.resize(); });
</script>
</body>
</html>
"#;

/// ECharts page rendering `option`. `plugins` are loaded after ECharts itself.
pub fn chart_page(title: &str, option: &Value, plugins: &[&str]) -> String {
    let scripts = std::iter::once(ECHARTS)
        .chain(plugins.iter().copied())
        .map(|file| format!(r#"<script src="{ASSETS}/{file}"></script>"#))
        .collect::<Vec<_>>()
        .join("\n");
    // A `</script>` inside a string value would end the script element.
    let option = option.to_string().replace("</", "<\\/");
    CHART_PAGE
        .replace("__TITLE__", &escape(title))
        .replace("__SCRIPTS__", &scripts)
        .replace("__OPTION__", &option)
}

/// Pull the option object back out of a rendered chart page.
pub fn extract_option(page: &str) -> Option<Value> {
    let start = page.find("var option = ")? + "var option = ".len();
    let end = start + page[start..].find(";\nchart.setOption")?;
    serde_json::from_str(&page[start..end].replace("<\\/", "</")).ok()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(
            escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn chart_page_loads_plugins_and_embeds_option() {
        let option = json!({"title": {"text": "Revenue"}, "series": [{"name": "</script>"}]});
        let page = chart_page("Revenue <2026>", &option, &[WORDCLOUD]);
        assert!(page.contains("<title>Revenue &lt;2026&gt;</title>"));
        assert!(page.contains("echarts.min.js"));
        assert!(page.contains("echarts-wordcloud.min.js"));
        assert!(!page.contains(r#""</script>""#));
        assert_eq!(extract_option(&page), Some(option));
    }
}
