//! 시스템 헬스 대시보드.
//!
//! Telegraf가 수집하는 `cpu`, `mem`, `disk`, `cpu_temp`, `system`, `net`,
//! `diskio` measurement를 사용합니다.

use crate::flux::FluxQuery;
use crate::model::{
    ColorConfig, CustomStyle, Dashboard, DashboardDocument, GridPos, OverrideProperty, Panel,
    PanelOptions, PanelType, Thresholds,
};
use serde_json::json;

/// 시스템 헬스 대시보드 UID
pub const SYSTEM_HEALTH_UID: &str = "system-health-raspi5";

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

fn usage_thresholds(yellow: f64, orange: f64, red: f64) -> Thresholds {
    Thresholds::absolute("green", &[("yellow", yellow), ("orange", orange), ("red", red)])
}

fn gauge(title: &str, x: u32, unit: &str, query: String, thresholds: Thresholds) -> Panel {
    Panel::new(PanelType::Gauge, title, GridPos::new(x, 0, 4, 6))
        .target("A", query)
        .unit(unit)
        .min_max(0.0, 100.0)
        .thresholds(thresholds)
}

fn trend(title: &str, grid: GridPos, unit: &str, query: String) -> Panel {
    Panel::new(PanelType::Timeseries, title, grid)
        .target("A", query)
        .unit(unit)
        .custom(CustomStyle::smooth_line(20))
}

/// 시스템 헬스 대시보드 문서를 생성합니다.
///
/// `data_mount`는 여유 공간을 표시할 데이터 디스크 마운트 경로입니다.
pub fn build_system_health_dashboard(bucket: &str, data_mount: &str) -> DashboardDocument {
    let mut dashboard = Dashboard::new("시스템 헬스 모니터링 (Raspberry Pi)", "now-6h")
        .with_uid(SYSTEM_HEALTH_UID)
        .with_tags(&["system", "telegraf", "raspi"])
        .with_refresh("1m");

    let latest = |measurement: &str, field: &str| {
        FluxQuery::new(bucket)
            .relative_range("-5m")
            .measurement(measurement)
            .field(field)
    };

    // 1행: 현재 상태
    dashboard.push_panel(
        gauge(
            "CPU 사용률",
            0,
            "percent",
            latest("cpu", "usage_idle")
                .last()
                .map_value("100.0 - r._value")
                .build(),
            usage_thresholds(50.0, 70.0, 90.0),
        )
        .options(PanelOptions::gauge_markers()),
    );
    dashboard.push_panel(gauge(
        "메모리 사용률",
        4,
        "percent",
        latest("mem", "used_percent").last().build(),
        usage_thresholds(60.0, 80.0, 90.0),
    ));
    dashboard.push_panel(gauge(
        "디스크 사용률 (rootfs)",
        8,
        "percent",
        latest("disk", "used_percent").tag_eq("path", "/").last().build(),
        usage_thresholds(60.0, 80.0, 90.0),
    ));
    dashboard.push_panel(gauge(
        "CPU 온도",
        12,
        "celsius",
        latest("cpu_temp", "value")
            .last()
            .map_value("r._value / 1000.0")
            .build(),
        usage_thresholds(50.0, 65.0, 80.0),
    ));

    let mut uptime_options = PanelOptions::stat_value();
    uptime_options.justify_mode = Some("auto".to_string());
    uptime_options.text_mode = Some("value".to_string());
    dashboard.push_panel(
        Panel::new(PanelType::Stat, "시스템 업타임", GridPos::new(16, 0, 4, 6))
            .target("A", latest("system", "uptime").last().build())
            .unit("s")
            .thresholds(Thresholds::absolute("green", &[]))
            .options(uptime_options),
    );

    dashboard.push_panel(
        Panel::new(
            PanelType::Stat,
            format!("디스크 여유 ({})", mount_label(data_mount)),
            GridPos::new(20, 0, 4, 6),
        )
        .target(
            "A",
            latest("disk", "free").tag_eq("path", data_mount).last().build(),
        )
        .unit("bytes")
        .thresholds(Thresholds::absolute(
            "red",
            &[("yellow", 100.0 * GIB), ("green", 500.0 * GIB)],
        ))
        .options(PanelOptions::stat_value()),
    );

    // 2행: 추이
    let y = 6;
    dashboard.push_panel(
        trend(
            "CPU 사용률 추이",
            GridPos::new(0, y, 8, 8),
            "percent",
            FluxQuery::new(bucket)
                .dashboard_range()
                .measurement("cpu")
                .field("usage_idle")
                .aggregate_window("1m", "mean")
                .map_value_as("100.0 - r._value", "사용률")
                .build(),
        )
        .min_max(0.0, 100.0)
        .color(ColorConfig::fixed("blue")),
    );
    dashboard.push_panel(
        trend(
            "메모리 사용량 추이",
            GridPos::new(8, y, 8, 8),
            "bytes",
            FluxQuery::new(bucket)
                .dashboard_range()
                .measurement("mem")
                .fields(&["used", "available"])
                .aggregate_window("1m", "mean")
                .build(),
        )
        .custom(CustomStyle::smooth_line(20).stacked())
        .override_field(
            "used",
            vec![OverrideProperty::new("color", json!({"fixedColor": "orange", "mode": "fixed"}))],
        )
        .override_field(
            "available",
            vec![OverrideProperty::new("color", json!({"fixedColor": "green", "mode": "fixed"}))],
        ),
    );
    dashboard.push_panel(
        trend(
            "CPU 온도 추이",
            GridPos::new(16, y, 8, 8),
            "celsius",
            FluxQuery::new(bucket)
                .dashboard_range()
                .measurement("cpu_temp")
                .field("value")
                .aggregate_window("1m", "mean")
                .map_value_as("r._value / 1000.0", "온도")
                .build(),
        )
        .min_max(30.0, 85.0)
        .color(ColorConfig::fixed("red"))
        .thresholds(usage_thresholds(50.0, 65.0, 80.0))
        .bottom_legend(),
    );

    // 3행: 네트워크/디스크 I/O
    let y = y + 8;
    dashboard.push_panel(
        trend(
            "네트워크 트래픽",
            GridPos::new(0, y, 12, 8),
            "Bps",
            FluxQuery::new(bucket)
                .dashboard_range()
                .measurement("net")
                .fields(&["bytes_recv", "bytes_sent"])
                .tag_in("interface", &["eth0", "tailscale0"])
                .derivative_per_second()
                .aggregate_window("1m", "mean")
                .build(),
        )
        .bottom_legend(),
    );
    dashboard.push_panel(
        trend(
            "디스크 I/O (SD카드)",
            GridPos::new(12, y, 12, 8),
            "Bps",
            FluxQuery::new(bucket)
                .dashboard_range()
                .measurement("diskio")
                .fields(&["read_bytes", "write_bytes"])
                .derivative_per_second()
                .aggregate_window("1m", "mean")
                .build(),
        )
        .bottom_legend(),
    );

    DashboardDocument::new(dashboard)
}

/// 마운트 경로의 마지막 구성요소 (`/raspi/WD4T` → `WD4T`).
fn mount_label(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(path)
}
