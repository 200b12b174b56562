use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use thiserror::Error;

use broadsheet_core::collector::InsightsBundle;

use crate::artifacts::*;
use crate::charts;
use crate::html::{chart_page, LIQUIDFILL, WORDCLOUD};
use crate::pages;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReportError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Per-submission values that end up in the rendered pages.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub session_id: String,
    pub version: String,
    /// Local time of the submission.
    pub generated_at: NaiveDateTime,
    /// Project page on the analytics platform.
    pub project_url: String,
    /// Public URL of the session directory.
    pub bundle_url: String,
    /// Landing page, target of the back buttons.
    pub home_url: String,
    /// Rows in each keyword table.
    pub top_keywords: usize,
}

impl ReportContext {
    /// Public URL of one artifact of this bundle.
    pub fn url(&self, file: &str) -> String {
        format!("{}/{}", self.bundle_url.trim_end_matches('/'), file)
    }
}

/// Writes a report bundle into one session directory.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    dir: PathBuf,
    ctx: ReportContext,
}

impl ReportBuilder {
    pub fn new(dir: impl Into<PathBuf>, ctx: ReportContext) -> Self {
        Self { dir: dir.into(), ctx }
    }

    /// Render every artifact in memory. The container comes last.
    pub fn render(&self, bundle: &InsightsBundle) -> Vec<(&'static str, String)> {
        let ctx = &self.ctx;
        let rows = &bundle.rows;
        let agg = &bundle.aggregates;
        let symbol = bundle.profile.currency_symbol.as_str();
        let top = ctx.top_keywords;
        let link = |file: &str| ctx.url(file);

        let cmgr = |file: &'static str, kpi: &str, description: &str, rate: f64| {
            (
                file,
                chart_page(kpi, &charts::cmgr_badge(kpi, description, rate, &link(file)), &[LIQUIDFILL]),
            )
        };

        let mut out = vec![
            (HEADER_NOTES, pages::header_notes(ctx, bundle)),
            (TOTALS, pages::totals_table(bundle)),
            (
                REVENUE_VISITS_BAR,
                chart_page(
                    "Revenue & visits",
                    &charts::revenue_visits_bar(rows, symbol, &link(REVENUE_VISITS_BAR)),
                    &[],
                ),
            ),
            (
                VISITS_PER_ORDER_LINE,
                chart_page(
                    "Visits per order",
                    &charts::visits_per_order_line(rows, agg, &link(VISITS_PER_ORDER_LINE)),
                    &[],
                ),
            ),
            (
                VISIT_VALUE_BAR,
                chart_page(
                    "Organic visit value",
                    &charts::visit_value_bar(rows, agg, symbol, &link(VISIT_VALUE_BAR)),
                    &[],
                ),
            ),
            (
                ORDERS_BAR,
                chart_page("No. of orders", &charts::orders_bar(rows, &link(ORDERS_BAR)), &[]),
            ),
            (
                ORDER_VALUE_BAR,
                chart_page(
                    "Order value",
                    &charts::order_value_bar(rows, agg, symbol, &link(ORDER_VALUE_BAR)),
                    &[],
                ),
            ),
            (
                VISITS_REVENUE_RIVER,
                chart_page(
                    "Revenue & visits trend",
                    &charts::visits_revenue_river(rows, &link(VISITS_REVENUE_RIVER)),
                    &[],
                ),
            ),
            (
                GAUGE,
                chart_page("Visits per order", &charts::visits_per_order_gauge(agg, &link(GAUGE)), &[]),
            ),
            cmgr(CMGR_REVENUE, "Revenue", "Monthly revenue growth", agg.cmgr.revenue),
            cmgr(CMGR_VISITS, "Visits", "Monthly organic visits growth", agg.cmgr.visits),
            cmgr(CMGR_VISIT_VALUE, "Visit value", "Monthly visit value growth", agg.cmgr.visit_value),
            cmgr(CMGR_ORDERS, "Orders", "Monthly orders growth", agg.cmgr.orders),
            cmgr(CMGR_ORDER_VALUE, "Order value", "Monthly order value growth", agg.cmgr.order_value),
            (
                WORDCLOUD_BRANDED,
                chart_page(
                    "Branded keywords",
                    &charts::keyword_cloud(&bundle.branded, "Branded keywords", &link(WORDCLOUD_BRANDED)),
                    &[WORDCLOUD],
                ),
            ),
            (
                WORDCLOUD_NON_BRANDED,
                chart_page(
                    "Non-branded keywords",
                    &charts::keyword_cloud(
                        &bundle.non_branded,
                        "Non-branded keywords",
                        &link(WORDCLOUD_NON_BRANDED),
                    ),
                    &[WORDCLOUD],
                ),
            ),
            (
                WINNING_KEYWORD_BRANDED,
                pages::winning_keyword(&bundle.branded, &bundle.keyword_month, "Winning branded keyword"),
            ),
            (
                WINNING_KEYWORD_NON_BRANDED,
                pages::winning_keyword(
                    &bundle.non_branded,
                    &bundle.keyword_month,
                    "Winning non-branded keyword",
                ),
            ),
            (
                BRANDED_INSIGHTS,
                pages::keyword_table(&bundle.branded, top, "Branded keyword insights"),
            ),
            (
                NON_BRANDED_INSIGHTS,
                pages::keyword_table(&bundle.non_branded, top, "Non-branded keyword insights"),
            ),
            (DETAIL_KPIS, pages::kpi_detail_table(bundle)),
            (
                FORECAST,
                chart_page(
                    "Revenue forecast",
                    &charts::forecast_line(&bundle.forecast, symbol, &link(FORECAST)),
                    &[],
                ),
            ),
            (FORECAST_NARRATIVE, pages::forecast_narrative(bundle)),
            (FOOTER_NOTES, pages::footer_notes(ctx)),
        ];
        out.push((CONTAINER, pages::container(ctx, bundle)));
        out
    }

    /// Write the bundle, creating the directory if needed. The container is
    /// written last so it never references a missing page.
    pub fn write_bundle(&self, bundle: &InsightsBundle) -> Result<Vec<PathBuf>, ReportError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| ReportError::io(&self.dir, e))?;
        let mut written = Vec::new();
        for (file, html) in self.render(bundle) {
            written.push(self.write(file, &html)?);
        }
        tracing::info!(
            session = %self.ctx.session_id,
            files = written.len(),
            dir = %self.dir.display(),
            "report bundle written"
        );
        Ok(written)
    }

    /// Replace whatever the directory holds with the error page alone.
    pub fn write_error_page(&self, message: &str) -> Result<PathBuf, ReportError> {
        if self.dir.exists() {
            std::fs::remove_dir_all(&self.dir).map_err(|e| ReportError::io(&self.dir, e))?;
        }
        std::fs::create_dir_all(&self.dir).map_err(|e| ReportError::io(&self.dir, e))?;
        let path = self.write(ERROR_PAGE, &pages::error_page(message, &self.ctx.home_url))?;
        tracing::info!(session = %self.ctx.session_id, "error page written");
        Ok(path)
    }

    fn write(&self, file: &str, html: &str) -> Result<PathBuf, ReportError> {
        let path = self.dir.join(file);
        std::fs::write(&path, html).map_err(|e| ReportError::io(&path, e))?;
        Ok(path)
    }
}
