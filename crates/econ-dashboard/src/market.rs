//! 경제·주가 통합 대시보드.
//!
//! 4행 레이아웃:
//! 1. 한국·미국 주가지수/ETF
//! 2. 경기(GDP·산업생산)와 물가(CPI)
//! 3. 금리와 환율
//! 4. 섹터/테마

use crate::flux::FluxQuery;
use crate::model::{
    ColorConfig, CustomStyle, Dashboard, DashboardDocument, GridPos, OverrideProperty, Panel,
    PanelType, TimePicker,
};

const ROW_HEIGHT: u32 = 8;
const STOCK_TAGS: &[&str] = &["name", "ticker"];
const INDICATOR_TAGS: &[&str] = &["indicator", "series_id", "period"];

fn stock_close(bucket: &str, names: &[&str]) -> String {
    FluxQuery::new(bucket)
        .dashboard_range()
        .measurement("stock_prices")
        .tag_in("name", names)
        .field("close")
        .aggregate_window("1d", "last")
        .series_from_tag("name", STOCK_TAGS)
        .build()
}

fn indicator(bucket: &str, names: &[&str], every: &str) -> String {
    FluxQuery::new(bucket)
        .dashboard_range()
        .measurement("economic_indicators")
        .tag_in("indicator", names)
        .field("value")
        .aggregate_window(every, "last")
        .series_from_tag("indicator", INDICATOR_TAGS)
        .build()
}

fn line_panel(title: &str, grid: GridPos, fill_opacity: u32) -> Panel {
    Panel::new(PanelType::Timeseries, title, grid)
        .custom(CustomStyle::smooth_line(fill_opacity))
        .color(ColorConfig::palette_classic())
        .bottom_legend()
}

fn stock_panel(bucket: &str, title: &str, grid: GridPos, names: &[&str]) -> Panel {
    line_panel(title, grid, 0).target("A", stock_close(bucket, names))
}

/// 시장 대시보드 문서를 생성합니다.
pub fn build_market_dashboard(bucket: &str) -> DashboardDocument {
    let mut dashboard = Dashboard::new("경제·주가 통합 모니터링 (15년, GDP 포함)", "now-15y")
        .with_tags(&["econ", "market", "15years", "gdp"])
        .with_refresh("5m")
        .with_timepicker(TimePicker {
            refresh_intervals: ["5m", "15m", "30m", "1h", "1d"].map(String::from).to_vec(),
            time_options: ["1y", "5y", "10y", "15y"].map(String::from).to_vec(),
        });

    // 1행: 주가지수/ETF
    let y = 0;
    dashboard.push_panel(
        line_panel("한국 주가지수/ETF", GridPos::new(0, y, 12, ROW_HEIGHT), 0)
            .custom(CustomStyle::smooth_line(0).hide_points())
            .target("A", stock_close(bucket, &["코스피", "코스닥", "KODEX200"])),
    );
    dashboard.push_panel(
        line_panel("미국 주가지수/ETF", GridPos::new(12, y, 12, ROW_HEIGHT), 0)
            .custom(CustomStyle::smooth_line(0).hide_points())
            .target(
                "A",
                stock_close(bucket, &["S&P500", "나스닥", "QQQ", "SPY", "DIA"]),
            ),
    );

    // 2행: 경기·물가
    let y = y + ROW_HEIGHT;
    let gdp = FluxQuery::new(bucket)
        .dashboard_range()
        .measurement("economic_indicators")
        .tag_matches(
            "indicator",
            &["한국 GDP.*실질.*전기비", "한국 GDP.*실질.*전년동기비"],
        )
        .field("value")
        .aggregate_window("3mo", "last")
        .series_from_tag("indicator", INDICATOR_TAGS)
        .build();
    dashboard.push_panel(
        line_panel("한국 경기 (실질GDP 성장률·산업생산)", GridPos::new(0, y, 12, ROW_HEIGHT), 10)
            .unit("percent")
            .target("GDP", gdp)
            .target("IND", indicator(bucket, &["미국 산업생산지수"], "1mo")),
    );
    dashboard.push_panel(
        line_panel("물가 (한국·미국 CPI)", GridPos::new(12, y, 12, ROW_HEIGHT), 10)
            .unit("short")
            .target("KR_CPI", indicator(bucket, &["한국 소비자물가지수"], "1mo"))
            .target("US_CPI", indicator(bucket, &["미국 CPI"], "1mo")),
    );

    // 3행: 금리·환율
    let y = y + ROW_HEIGHT;
    dashboard.push_panel(
        line_panel("미국 금리 (연방기금금리 vs 10년 국채)", GridPos::new(0, y, 12, ROW_HEIGHT), 0)
            .custom(CustomStyle::smooth_line(0).hide_points())
            .unit("percent")
            .target(
                "A",
                indicator(bucket, &["연방기금금리", "미국 10년 국채금리"], "1d"),
            ),
    );
    let us10y = FluxQuery::new(bucket)
        .dashboard_range()
        .measurement("economic_indicators")
        .tag_eq("indicator", "미국 10년 국채금리")
        .field("value")
        .aggregate_window("1d", "last")
        .scaled_series_from_tag("r._value * 100.0", "indicator", INDICATOR_TAGS)
        .build();
    dashboard.push_panel(
        line_panel("환율 (USD/KRW) + 미국 10년물 금리", GridPos::new(12, y, 12, ROW_HEIGHT), 10)
            .custom(CustomStyle::smooth_line(10).axis_auto())
            .target("FX", indicator(bucket, &["USD/KRW 환율"], "1d"))
            .target("US10Y", us10y)
            .override_field(
                "USD/KRW 환율",
                vec![
                    OverrideProperty::new("custom.axisPlacement", "left"),
                    OverrideProperty::new("unit", "short"),
                ],
            )
            .override_field(
                "미국 10년 국채금리",
                vec![
                    OverrideProperty::new("custom.axisPlacement", "right"),
                    OverrideProperty::new("unit", "percent"),
                ],
            ),
    );

    // 4행: 섹터/테마
    let y = y + ROW_HEIGHT;
    dashboard.push_panel(stock_panel(
        bucket,
        "IT 플랫폼 (NAVER·카카오)",
        GridPos::new(0, y, 8, ROW_HEIGHT),
        &["NAVER", "카카오"],
    ));
    dashboard.push_panel(stock_panel(
        bucket,
        "엔터테인먼트·게임",
        GridPos::new(8, y, 8, ROW_HEIGHT),
        &["HYBE", "SM", "JYP Ent.", "크래프톤", "엔씨소프트"],
    ));
    dashboard.push_panel(stock_panel(
        bucket,
        "대형주 (반도체·자동차·금융)",
        GridPos::new(16, y, 8, ROW_HEIGHT),
        &["삼성전자", "SK하이닉스", "현대차", "KB금융"],
    ));

    DashboardDocument::new(dashboard)
}
