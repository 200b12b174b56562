//! ECharts option objects for the chart artifacts.

use serde_json::{json, Value};

use broadsheet_core::collector::KeywordStat;
use broadsheet_core::format::{decimal2, percent_rounded};
use broadsheet_core::kpi::{Aggregates, ForecastStep, MonthlyRow};

const ACCENT: &str = "DeepSkyBlue";
const SECONDARY: &str = "LightSlateGray";

/// Title whose text opens `link` (the full-screen chart) in a new window.
fn title(text: &str, subtext: &str, link: &str) -> Value {
    json!({
        "text": text,
        "subtext": subtext,
        "link": link,
        "target": "blank",
        "left": "center",
        "textStyle": {"color": ACCENT},
    })
}

fn labels(rows: &[MonthlyRow]) -> Vec<String> {
    rows.iter().map(|r| r.bucket.label()).collect()
}

fn toolbox() -> Value {
    json!({"show": true, "feature": {"saveAsImage": {"title": "Save"}, "dataView": {"title": "Data", "readOnly": true}}})
}

fn bar(
    rows: &[MonthlyRow],
    title_text: &str,
    subtext: &str,
    link: &str,
    series_name: &str,
    values: Vec<Value>,
) -> Value {
    json!({
        "title": title(title_text, subtext, link),
        "tooltip": {"trigger": "axis"},
        "toolbox": toolbox(),
        "legend": {"top": "bottom"},
        "xAxis": {"type": "category", "data": labels(rows)},
        "yAxis": {"type": "value"},
        "series": [{
            "name": series_name,
            "type": "bar",
            "data": values,
            "itemStyle": {"color": ACCENT},
            "label": {"show": true, "position": "top"},
        }],
    })
}

pub fn revenue_visits_bar(rows: &[MonthlyRow], symbol: &str, link: &str) -> Value {
    let revenue: Vec<u64> = rows.iter().map(|r| r.kpi.revenue).collect();
    let visits: Vec<u64> = rows.iter().map(|r| r.kpi.visits).collect();
    json!({
        "title": title("Revenue & visits", &format!("Organic revenue ({symbol}) and organic visits per month"), link),
        "tooltip": {"trigger": "axis"},
        "toolbox": toolbox(),
        "legend": {"top": "bottom"},
        "xAxis": {"type": "category", "data": labels(rows)},
        "yAxis": [
            {"type": "value", "name": format!("Revenue ({symbol})")},
            {"type": "value", "name": "Visits"},
        ],
        "series": [
            {"name": "Revenue", "type": "bar", "data": revenue, "itemStyle": {"color": ACCENT}},
            {"name": "Visits", "type": "bar", "yAxisIndex": 1, "data": visits, "itemStyle": {"color": SECONDARY}},
        ],
    })
}

pub fn visits_per_order_line(rows: &[MonthlyRow], agg: &Aggregates, link: &str) -> Value {
    let values: Vec<u64> = rows.iter().map(|r| r.kpi.visits_per_order).collect();
    json!({
        "title": title(
            "Visits per order",
            &format!("On average an order is placed every {} organic visits", agg.average_visits_per_order),
            link,
        ),
        "tooltip": {"trigger": "axis"},
        "toolbox": toolbox(),
        "xAxis": {"type": "category", "data": labels(rows)},
        "yAxis": {"type": "value"},
        "series": [{
            "name": "Visits per order",
            "type": "line",
            "smooth": true,
            "data": values,
            "itemStyle": {"color": ACCENT},
            "markLine": {"data": [{"type": "average", "name": "Average"}]},
        }],
    })
}

pub fn visit_value_bar(rows: &[MonthlyRow], agg: &Aggregates, symbol: &str, link: &str) -> Value {
    let values = rows.iter().map(|r| json!(r.kpi.visit_value)).collect();
    bar(
        rows,
        "Organic visit value",
        &format!("Average value of an organic visit: {symbol}{}", decimal2(agg.average_visit_value)),
        link,
        "Visit value",
        values,
    )
}

pub fn orders_bar(rows: &[MonthlyRow], link: &str) -> Value {
    let values = rows.iter().map(|r| json!(r.kpi.orders)).collect();
    bar(rows, "No. of orders", "Orders placed by organic visitors", link, "Orders", values)
}

pub fn order_value_bar(rows: &[MonthlyRow], agg: &Aggregates, symbol: &str, link: &str) -> Value {
    let values = rows.iter().map(|r| json!(r.kpi.order_value)).collect();
    bar(
        rows,
        "Order value",
        &format!("Average order value: {symbol}{}", agg.average_order_value),
        link,
        "Order value",
        values,
    )
}

/// Theme river of revenue and visits over time.
pub fn visits_revenue_river(rows: &[MonthlyRow], link: &str) -> Value {
    let mut data = Vec::with_capacity(rows.len() * 2);
    for row in rows {
        let date = row.bucket.axis_date();
        data.push(json!([date, row.kpi.revenue, "Revenue"]));
        data.push(json!([date, row.kpi.visits, "Visits"]));
    }
    json!({
        "title": title("Revenue & visits", "Monthly trend", link),
        "tooltip": {"trigger": "axis", "axisPointer": {"type": "line"}},
        "legend": {"top": "bottom", "data": ["Revenue", "Visits"]},
        "singleAxis": {"type": "time", "top": 60, "bottom": 60},
        "series": [{
            "type": "themeRiver",
            "data": data,
            "label": {"show": false},
        }],
    })
}

/// Gauge of the average visits per order between the monthly extremes.
pub fn visits_per_order_gauge(agg: &Aggregates, link: &str) -> Value {
    let min = agg.min_visits_per_order.unwrap_or(0);
    let max = agg.max_visits_per_order.max(agg.average_visits_per_order).max(min + 1);
    json!({
        "title": title(
            "Visits per order",
            &format!(
                "Min {} / max {} visits per order",
                agg.min_visits_per_order_or_sentinel(),
                agg.max_visits_per_order
            ),
            link,
        ),
        "series": [{
            "type": "gauge",
            "min": min,
            "max": max,
            "progress": {"show": true},
            "detail": {"valueAnimation": true, "formatter": "{value}"},
            "data": [{"value": agg.average_visits_per_order, "name": "Avg. visits per order"}],
        }],
    })
}

/// Liquid badge showing a growth rate rounded to a whole percentage.
pub fn cmgr_badge(kpi: &str, description: &str, rate: f64, link: &str) -> Value {
    json!({
        "title": title(
            description,
            &format!("Compound growth CMGR. Rounded from {}%", decimal2(rate * 100.0)),
            link,
        ),
        "series": [{
            "type": "liquidFill",
            "name": kpi,
            "data": [rate],
            "radius": "60%",
            "shape": "roundRect",
            "outline": {"show": false},
            "label": {"fontSize": 36, "formatter": percent_rounded(rate)},
        }],
    })
}

/// Word cloud of the distribution, leaving out the top keyword.
pub fn keyword_cloud(keywords: &[KeywordStat], title_text: &str, link: &str) -> Value {
    let data: Vec<Value> = keywords
        .iter()
        .skip(1)
        .map(|k| json!({"name": k.keyword, "value": k.clicks}))
        .collect();
    json!({
        "title": title(title_text, "Top keywords by clicks, excluding the winning keyword", link),
        "tooltip": {"show": true},
        "series": [{
            "type": "wordCloud",
            "shape": "circle",
            "sizeRange": [14, 60],
            "rotationRange": [0, 0],
            "gridSize": 8,
            "data": data,
        }],
    })
}

pub fn forecast_line(forecast: &[ForecastStep], symbol: &str, link: &str) -> Value {
    let visits: Vec<String> = forecast
        .iter()
        .map(|s| broadsheet_core::format::thousands(s.visits))
        .collect();
    let revenue: Vec<u64> = forecast.iter().map(|s| s.revenue).collect();
    json!({
        "title": title(
            "Revenue forecast",
            &format!("Projected incremental revenue ({symbol}) by additional organic visits"),
            link,
        ),
        "tooltip": {"trigger": "axis"},
        "toolbox": toolbox(),
        "xAxis": {"type": "category", "name": "Visits", "data": visits},
        "yAxis": {"type": "value", "name": format!("Revenue ({symbol})")},
        "series": [{
            "name": "Projected revenue",
            "type": "line",
            "data": revenue,
            "areaStyle": {},
            "itemStyle": {"color": ACCENT},
        }],
    })
}
