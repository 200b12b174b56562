//! Tables, narratives and the container page.

use std::fmt::Write as _;

use broadsheet_core::collector::{click_gap, InsightsBundle, KeywordStat};
use broadsheet_core::format::{decimal2, money, thousands};
use broadsheet_core::planner::MonthBucket;

use crate::artifacts;
use crate::builder::ReportContext;
use crate::html::{escape, text_page};

const NOTE_STYLE: &str = r#".content{color:gray;font-size:15px;padding:5px}
.content a{color:DeepSkyBlue}
.warning{color:red}
strong{color:DeepSkyBlue}"#;

const TABLE_STYLE: &str = r#"table{width:100%;border-collapse:collapse;color:DimGray;margin:5px 0;font-size:17px;text-align:left}
th,td{padding:12px;border-bottom:1px solid #ddd}
th{background-color:white;color:DeepSkyBlue}
tr:nth-child(odd){background-color:#f9f9f9}
tr:hover{background-color:LightCyan}"#;

const NARRATIVE_STYLE: &str = r#"body{display:flex;justify-content:center;align-items:center;height:100vh}
.content{border:2px solid LightGray;border-radius:40px;padding:30px;text-align:center;max-width:900px}
.narrative{font-size:18px;color:LightSlateGray;line-height:1.6}
.highlight{color:DeepSkyBlue;font-size:25px;font-weight:bold}
b{color:#333}"#;

pub fn header_notes(ctx: &ReportContext, bundle: &InsightsBundle) -> String {
    let tenant = &bundle.tenant;
    let mut body = String::from(r#"<div class="content">"#);
    let _ = write!(
        body,
        r#"<span>The following insights are based on the previous {months} months.</span>
<span>Access the project <a href="{project_url}" target="_blank">here</a> ({org}/{project}).</span>
<br><br>
<span>Click the chart title to view the chart in a new window.</span>
<br><br>
<span>This broadsheet for <strong>{customer}</strong> was generated on {date} at {time}.</span>
<br>
<span>Version {version}. Session {session}.</span>
"#,
        months = bundle.months(),
        project_url = escape(&ctx.project_url),
        org = escape(&tenant.organisation),
        project = escape(&tenant.project),
        customer = escape(&bundle.profile.customer_name),
        date = ctx.generated_at.format("%d %B %Y"),
        time = ctx.generated_at.format("%H:%M"),
        version = escape(&ctx.version),
        session = escape(&ctx.session_id),
    );
    if bundle.issues.any() {
        let _ = write!(
            body,
            r#"<br><span class="warning">Warning: There are possible data quality issues with {}.</span>"#,
            bundle.issues.affected().join(", ")
        );
    }
    body.push_str("</div>");
    text_page("Header", NOTE_STYLE, &body)
}

pub fn totals_table(bundle: &InsightsBundle) -> String {
    let agg = &bundle.aggregates;
    let symbol = &bundle.profile.currency_symbol;
    let cells = [
        ("Visits", thousands(agg.total_visits)),
        ("Orders", thousands(agg.total_orders)),
        ("Revenue", money(symbol, agg.total_revenue)),
        ("Average order value", money(symbol, agg.average_order_value)),
        ("Revenue per visit", format!("{symbol}{}", decimal2(agg.average_visit_value))),
        ("Visits per order", thousands(agg.average_visits_per_order)),
    ];
    let style = r#"body{display:flex;justify-content:center;align-items:center;height:100vh}
.wrapper{display:grid;grid-template-columns:repeat(3,1fr);gap:20px;width:80%;max-width:1200px}
.cell{text-align:center}
.label{font-size:18px;color:LightSlateGray}
.value{font-size:30px;color:DeepSkyBlue;font-weight:bold}"#;
    let mut body = String::from(r#"<div class="wrapper">"#);
    for (label, value) in cells {
        let _ = write!(
            body,
            r#"<div class="cell"><div class="label">{label}</div><div class="value">{}</div></div>"#,
            escape(&value)
        );
    }
    body.push_str("</div>");
    text_page("Your SEO KPI totals", style, &body)
}

pub fn kpi_detail_table(bundle: &InsightsBundle) -> String {
    let symbol = escape(&bundle.profile.currency_symbol);
    let mut body = String::from(
        "<table>\n<tr><th>Date</th><th>No. of orders</th><th>Revenue</th><th>Order value</th>\
         <th>No. of visits</th><th>Visit value</th><th>Visits per order</th></tr>\n",
    );
    for row in &bundle.rows {
        let k = &row.kpi;
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{symbol}{}</td><td>{symbol}{}</td><td>{}</td><td>{symbol}{}</td><td>{}</td></tr>",
            row.bucket.label(),
            thousands(k.orders),
            thousands(k.revenue),
            thousands(k.order_value),
            thousands(k.visits),
            decimal2(k.visit_value),
            thousands(k.visits_per_order),
        );
    }
    body.push_str("</table>");
    text_page("KPIs", TABLE_STYLE, &body)
}

/// The first `limit` keywords with clicks, CTR and average position.
pub fn keyword_table(keywords: &[KeywordStat], limit: usize, title: &str) -> String {
    let mut body = String::from(
        "<table>\n<tr><th>Keyword</th><th>No. of Clicks</th><th>CTR</th><th>Average Position</th></tr>\n",
    );
    for k in keywords.iter().take(limit) {
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{:.2}%</td><td>{:.2}</td></tr>",
            escape(&k.keyword),
            thousands(k.clicks),
            k.ctr,
            k.avg_position,
        );
    }
    body.push_str("</table>");
    text_page(title, TABLE_STYLE, &body)
}

pub fn winning_keyword(keywords: &[KeywordStat], month: &MonthBucket, title: &str) -> String {
    let Some(winner) = keywords.first() else {
        return text_page(title, NARRATIVE_STYLE, r#"<div class="content">No keywords found.</div>"#);
    };
    let mut text = format!(
        r#"The winning keyword was <span class="highlight">{}</span> during <b>{}</b>. This keyword generated <b>{}</b> clicks"#,
        escape(&winner.keyword),
        month.label(),
        thousands(winner.clicks),
    );
    match (click_gap(keywords), keywords.get(1)) {
        (Some(gap), Some(second)) => {
            let _ = write!(
                text,
                " which is <b>{gap}%</b> more clicks than the second placed keyword <b>{}</b>.",
                escape(&second.keyword)
            );
        }
        _ => text.push('.'),
    }
    let _ = write!(
        text,
        " The click-through rate for the winning keyword was <b>{:.2}%</b> from an average position of <b>{:.2}</b>.",
        winner.ctr, winner.avg_position
    );
    let body = format!(r#"<div class="content"><p class="narrative">{text}</p></div>"#);
    text_page(title, NARRATIVE_STYLE, &body)
}

pub fn forecast_narrative(bundle: &InsightsBundle) -> String {
    let agg = &bundle.aggregates;
    let symbol = escape(&bundle.profile.currency_symbol);
    let increment = thousands(bundle.forecast_increment);
    let text = if agg.average_visits_per_order == 0 {
        "<b>Example scenario:</b> there were not enough orders in the period to forecast incremental revenue.".to_string()
    } else {
        let orders = bundle.orders_per_increment();
        let revenue = orders * agg.average_order_value;
        format!(
            r#"<b>Example scenario:</b> On average an order is placed every <span class="highlight">{vpo}</span> organic visits.
For each additional <span class="highlight">{increment}</span> organic visits, the current forecast is <span class="highlight">{orders}</span> orders will be placed.
With an average order value of <span class="highlight">{symbol}{aov}</span> the projected incremental revenue from <span class="highlight">{increment}</span> additional visits will be <span class="highlight">{symbol}{revenue}</span>."#,
            vpo = thousands(agg.average_visits_per_order),
            orders = thousands(orders),
            aov = thousands(agg.average_order_value),
            revenue = thousands(revenue),
        )
    };
    let body = format!(r#"<div class="content"><p class="narrative">{text}</p></div>"#);
    text_page("Revenue forecast", NARRATIVE_STYLE, &body)
}

pub fn footer_notes(ctx: &ReportContext) -> String {
    let permalink = escape(&ctx.url(artifacts::CONTAINER));
    let notes = [
        "The current month is not included in the analysis, only full months are reported on.".to_string(),
        "Compound Growth (CMGR) refers to the Compound Monthly Growth Rate of the KPI. CMGR measures the growth rate of a metric on a monthly basis taking into account the compounding effect.".to_string(),
        "The CMGR values presented are rounded to the nearest whole number, while the visualisation subtitle provides the exact calculated value.".to_string(),
        format!(r#"The permalink for this broadsheet is <a href="{permalink}">{permalink}</a>"#),
    ];
    let mut body = String::from("<ul class=\"content\">\n");
    for note in notes {
        let _ = writeln!(body, "<li>{note}</li>");
    }
    body.push_str("</ul>");
    text_page("Footer notes", NOTE_STYLE, &body)
}

const SHELL_STYLE: &str = r#"body{background-color:rgba(204,255,204,0.5)}
.banner{background-color:DeepSkyBlue;color:white;text-align:center;padding:15px 0}
.banner.top{font-size:24px}
.banner.bottom{font-size:12px}
.container{display:flex;flex-wrap:wrap;align-items:center;gap:20px;margin:5px auto;width:90%}
.title{background-color:LightCyan;color:LightSlateGray;text-align:center;padding:5px;margin:15px auto 5px;font-size:22px;border-radius:10px;width:90%}
iframe{flex:1 1 auto;min-width:200px;width:100%;border:2px solid LightGray;border-radius:10px;background:white}
.no-border iframe{border:none}
.tall{height:750px}
.medium{height:500px}
.short{height:400px}
.back-button{padding:12px 24px;font-size:18px;color:white;background-color:#007BFF;border:none;border-radius:8px;cursor:pointer;position:fixed;bottom:20px;right:20px;box-shadow:0 4px 6px rgba(0,0,0,0.1)}
.back-button:hover{background-color:#0056b3}
.error-message{display:flex;justify-content:center;align-items:center;height:60vh;font-size:24px;color:LightSlateGray;text-align:center;padding:0 10%}"#;

fn banner() -> &'static str {
    r#"<header class="banner top"><span>SEO</span><br><span style="font-size:20px">Business insights broadsheet</span></header>"#
}

fn back_button(label: &str, home_url: &str) -> String {
    format!(
        r#"<button class="back-button" onclick="window.open('{}', '_blank')">{}</button>"#,
        escape(home_url),
        escape(label)
    )
}

fn frame(file: &str, title: &str, class: &str) -> String {
    format!(r#"<iframe src="{file}" title="{}" class="{class}"></iframe>"#, escape(title))
}

fn section(heading: Option<&str>, extra_class: &str, frames: &[String]) -> String {
    let mut out = String::new();
    if let Some(heading) = heading {
        let _ = writeln!(out, r#"<div class="title">{}</div>"#, escape(heading));
    }
    let _ = writeln!(out, r#"<section class="container {extra_class}">"#);
    for f in frames {
        let _ = writeln!(out, "    {f}");
    }
    out.push_str("</section>\n");
    out
}

/// The entry page framing every other artifact.
pub fn container(ctx: &ReportContext, bundle: &InsightsBundle) -> String {
    use artifacts::*;

    let mut body = String::new();
    body.push_str(banner());
    body.push_str(&back_button("New broadsheet", &ctx.home_url));
    body.push('\n');
    body.push_str(&section(
        None,
        "no-border",
        &[format!(r#"<iframe src="{HEADER_NOTES}" title="Header" style="height:170px"></iframe>"#)],
    ));
    body.push_str(&section(
        Some("Your SEO KPI totals"),
        "no-border",
        &[format!(r#"<iframe src="{TOTALS}" title="Totals" style="height:300px"></iframe>"#)],
    ));
    body.push_str(&section(Some("Revenue & visits"), "", &[frame(REVENUE_VISITS_BAR, "Revenue & visits", "tall")]));
    body.push_str(&section(
        Some("Growth"),
        "",
        &[
            frame(CMGR_REVENUE, "CMGR Revenue", "short"),
            frame(CMGR_VISITS, "CMGR Visits", "short"),
        ],
    ));
    body.push_str(&section(
        Some("Visits per order"),
        "",
        &[frame(VISITS_PER_ORDER_LINE, "Visits per order", "tall")],
    ));
    body.push_str(&section(Some("Orders"), "", &[frame(ORDERS_BAR, "No. of orders", "medium")]));
    body.push_str(&section(
        Some("Revenue forecast"),
        "",
        &[
            frame(FORECAST, "Revenue forecast", "tall"),
            frame(FORECAST_NARRATIVE, "Forecast narrative", "tall"),
        ],
    ));
    body.push_str(&section(
        None,
        "",
        &[
            frame(GAUGE, "Visits per order gauge", "short"),
            frame(CMGR_ORDERS, "CMGR Orders", "short"),
        ],
    ));
    body.push_str(&section(Some("Order value"), "", &[frame(ORDER_VALUE_BAR, "Order value", "medium")]));
    body.push_str(&section(None, "", &[frame(VISITS_REVENUE_RIVER, "Revenue & visits trend", "medium")]));
    body.push_str(&section(
        Some("Organic visit value"),
        "",
        &[frame(VISIT_VALUE_BAR, "Organic visit value", "tall")],
    ));
    body.push_str(&section(
        None,
        "",
        &[
            frame(CMGR_VISIT_VALUE, "CMGR Visit Value", "short"),
            frame(CMGR_ORDER_VALUE, "CMGR Order Value", "short"),
        ],
    ));
    body.push_str(&section(
        Some(&format!("Monthly KPIs ({} months)", bundle.months())),
        "no-border",
        &[frame(DETAIL_KPIS, "KPIs", "tall")],
    ));
    body.push_str(&section(
        Some("Branded keywords"),
        "no-border",
        &[
            frame(WORDCLOUD_BRANDED, "Branded keyword wordcloud", "tall"),
            frame(BRANDED_INSIGHTS, "Branded keyword insights", "tall"),
        ],
    ));
    body.push_str(&section(
        None,
        "no-border",
        &[format!(
            r#"<iframe src="{WINNING_KEYWORD_BRANDED}" title="Winning branded keyword" style="height:200px"></iframe>"#
        )],
    ));
    body.push_str(&section(
        Some("Non-branded keywords"),
        "no-border",
        &[
            frame(WORDCLOUD_NON_BRANDED, "Non-branded keyword wordcloud", "tall"),
            frame(NON_BRANDED_INSIGHTS, "Non-branded keyword insights", "tall"),
        ],
    ));
    body.push_str(&section(
        None,
        "no-border",
        &[format!(
            r#"<iframe src="{WINNING_KEYWORD_NON_BRANDED}" title="Winning non-branded keyword" style="height:200px"></iframe>"#
        )],
    ));
    body.push_str(&section(
        None,
        "no-border",
        &[format!(r#"<iframe src="{FOOTER_NOTES}" title="Footer notes" style="height:220px"></iframe>"#)],
    ));
    let _ = write!(
        body,
        r#"<footer class="banner bottom">{} broadsheet. Session {}.</footer>"#,
        escape(&bundle.tenant.organisation),
        escape(&ctx.session_id)
    );
    text_page("SEO business insights broadsheet", SHELL_STYLE, &body)
}

/// Page shown instead of the container when a broadsheet cannot be built.
pub fn error_page(message: &str, home_url: &str) -> String {
    let body = format!(
        r#"{banner}
{button}
<div class="error-message" id="error-message">{message}</div>"#,
        banner = banner(),
        button = back_button("Try again", home_url),
        message = escape(message),
    );
    text_page("SEO business insights broadsheet", SHELL_STYLE, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(keyword: &str, clicks: u64) -> KeywordStat {
        KeywordStat {
            keyword: keyword.to_string(),
            clicks,
            ctr: 4.5,
            avg_position: 2.25,
        }
    }

    fn month() -> MonthBucket {
        MonthBucket::containing(chrono::NaiveDate::from_ymd_opt(2026, 9, 1).expect("date"))
    }

    #[test]
    fn winning_keyword_reports_click_gap() {
        let page = winning_keyword(&[kw("acme shoes", 1_000), kw("acme boots", 500)], &month(), "Winning");
        assert!(page.contains("acme shoes"));
        assert!(page.contains("September 2026"));
        assert!(page.contains("<b>1,000</b> clicks"));
        assert!(page.contains("<b>100%</b> more clicks"));
        assert!(page.contains("acme boots"));
        assert!(page.contains("<b>4.50%</b>"));
    }

    #[test]
    fn winning_keyword_without_runner_up_skips_comparison() {
        let page = winning_keyword(&[kw("only", 10)], &month(), "Winning");
        assert!(page.contains("<b>10</b> clicks."));
        assert!(!page.contains("second placed"));

        let page = winning_keyword(&[kw("top", 10), kw("zero", 0)], &month(), "Winning");
        assert!(!page.contains("second placed"));
    }

    #[test]
    fn keyword_table_escapes_and_limits() {
        let keywords: Vec<KeywordStat> = (0..10).map(|i| kw(&format!("<kw{i}>"), 100 - i)).collect();
        let page = keyword_table(&keywords, 4, "Branded");
        assert_eq!(page.matches("<tr><td>").count(), 4);
        assert!(page.contains("&lt;kw0&gt;"));
        assert!(page.contains("<td>4.50%</td><td>2.25</td>"));
    }

    #[test]
    fn error_page_shows_escaped_message() {
        let page = error_page("No project found. (acme/<demo>)", "http://localhost/");
        assert!(page.contains("No project found. (acme/&lt;demo&gt;)"));
        assert!(page.contains("Try again"));
        assert!(!page.contains("iframe"));
    }
}
