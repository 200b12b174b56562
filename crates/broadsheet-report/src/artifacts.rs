//! File names of a report bundle, relative to the session directory.

pub const CONTAINER: &str = "go_seo_BusinessInsights.html";
pub const ERROR_PAGE: &str = "go_seo_BusinessInsights_error.html";

pub const HEADER_NOTES: &str = "go_seo_HeaderNotes.html";
pub const TOTALS: &str = "go_seo_TotalsVisitsOrdersRevenue.html";
pub const REVENUE_VISITS_BAR: &str = "go_seo_RevenueVisitsBar.html";
pub const VISITS_PER_ORDER_LINE: &str = "go_seo_VisitsPerOrderLine.html";
pub const VISIT_VALUE_BAR: &str = "go_seo_VisitValueBar.html";
pub const ORDERS_BAR: &str = "go_seo_OrdersBar.html";
pub const ORDER_VALUE_BAR: &str = "go_seo_OrderValueBar.html";
pub const VISITS_REVENUE_RIVER: &str = "go_seo_VisitsRevenueRiver.html";
pub const GAUGE: &str = "go_seo_Gauge.html";

pub const CMGR_REVENUE: &str = "go_seo_CMGRRevenue.html";
pub const CMGR_VISITS: &str = "go_seo_CMGRVisits.html";
pub const CMGR_VISIT_VALUE: &str = "go_seo_CMGRVisitValue.html";
pub const CMGR_ORDERS: &str = "go_seo_CMGROrders.html";
pub const CMGR_ORDER_VALUE: &str = "go_seo_CMGROrderValue.html";

pub const WORDCLOUD_BRANDED: &str = "go_seo_WordcloudBranded.html";
pub const WORDCLOUD_NON_BRANDED: &str = "go_seo_WordcloudNonBranded.html";
pub const WINNING_KEYWORD_BRANDED: &str = "go_seo_WinningKeywordBranded.html";
pub const WINNING_KEYWORD_NON_BRANDED: &str = "go_seo_WinningKeywordNonBranded.html";
pub const BRANDED_INSIGHTS: &str = "go_seo_BrandedInsights.html";
pub const NON_BRANDED_INSIGHTS: &str = "go_seo_NonBrandedInsights.html";

pub const DETAIL_KPIS: &str = "go_seo_DataInsightDetailKPIs.html";
pub const FORECAST: &str = "go_seo_Forecast.html";
pub const FORECAST_NARRATIVE: &str = "go_seo_ForecastNarrative.html";
pub const FOOTER_NOTES: &str = "go_seo_FooterNotes.html";

/// Every page the container frames.
pub const FRAMED: [&str; 24] = [
    HEADER_NOTES,
    TOTALS,
    REVENUE_VISITS_BAR,
    VISITS_PER_ORDER_LINE,
    VISIT_VALUE_BAR,
    ORDERS_BAR,
    ORDER_VALUE_BAR,
    VISITS_REVENUE_RIVER,
    GAUGE,
    CMGR_REVENUE,
    CMGR_VISITS,
    CMGR_VISIT_VALUE,
    CMGR_ORDERS,
    CMGR_ORDER_VALUE,
    WORDCLOUD_BRANDED,
    WORDCLOUD_NON_BRANDED,
    WINNING_KEYWORD_BRANDED,
    WINNING_KEYWORD_NON_BRANDED,
    BRANDED_INSIGHTS,
    NON_BRANDED_INSIGHTS,
    DETAIL_KPIS,
    FORECAST,
    FORECAST_NARRATIVE,
    FOOTER_NOTES,
];
