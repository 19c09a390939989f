//! Grafana 대시보드 JSON 모델.
//!
//! `POST /api/dashboards/db` 페이로드(`{dashboard, folderId, overwrite}`)와
//! 같은 모양으로 직렬화됩니다. 값이 없는 선택 항목은 출력하지 않습니다.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;

/// 기본 InfluxDB 데이터소스 UID
pub const INFLUXDB_DATASOURCE_UID: &str = "influxdb";

/// 업로드 문서.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardDocument {
    pub dashboard: Dashboard,
    pub folder_id: i64,
    pub overwrite: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DashboardDocument {
    /// 기본 폴더(0)에 덮어쓰기로 업로드하는 문서.
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard,
            folder_id: 0,
            overwrite: true,
            message: None,
        }
    }

    /// 업로드 메시지 설정
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// pretty JSON으로 저장합니다 (상위 디렉토리 자동 생성).
    pub fn write_pretty(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// 대시보드 본문.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    pub title: String,
    pub tags: Vec<String>,
    pub timezone: String,
    pub refresh: String,
    pub time: TimeRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timepicker: Option<TimePicker>,
    pub panels: Vec<Panel>,
}

impl Dashboard {
    /// Asia/Seoul 시간대 대시보드를 생성합니다.
    pub fn new(title: impl Into<String>, time_from: impl Into<String>) -> Self {
        Self {
            uid: None,
            title: title.into(),
            tags: Vec::new(),
            timezone: "Asia/Seoul".to_string(),
            refresh: "5m".to_string(),
            time: TimeRange {
                from: time_from.into(),
                to: "now".to_string(),
            },
            timepicker: None,
            panels: Vec::new(),
        }
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_refresh(mut self, refresh: impl Into<String>) -> Self {
        self.refresh = refresh.into();
        self
    }

    pub fn with_timepicker(mut self, timepicker: TimePicker) -> Self {
        self.timepicker = Some(timepicker);
        self
    }

    /// 패널을 추가합니다. 패널 ID는 추가 순서대로 1부터 부여됩니다.
    pub fn push_panel(&mut self, mut panel: Panel) {
        panel.id = self.panels.len() as u32 + 1;
        self.panels.push(panel);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePicker {
    pub refresh_intervals: Vec<String>,
    pub time_options: Vec<String>,
}

/// 패널 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelType {
    Timeseries,
    Gauge,
    Stat,
}

/// 대시보드 패널.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    pub id: u32,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: PanelType,
    pub grid_pos: GridPos,
    pub targets: Vec<Target>,
    pub field_config: FieldConfig,
    #[serde(default, skip_serializing_if = "PanelOptions::is_empty")]
    pub options: PanelOptions,
}

impl Panel {
    /// 새 패널. ID는 [`Dashboard::push_panel`]에서 부여됩니다.
    pub fn new(kind: PanelType, title: impl Into<String>, grid_pos: GridPos) -> Self {
        Self {
            id: 0,
            title: title.into(),
            kind,
            grid_pos,
            targets: Vec::new(),
            field_config: FieldConfig::default(),
            options: PanelOptions::default(),
        }
    }

    /// 쿼리 추가 (InfluxDB 데이터소스)
    pub fn target(mut self, ref_id: impl Into<String>, query: impl Into<String>) -> Self {
        self.targets.push(Target {
            datasource: DatasourceRef::influxdb(),
            query: query.into(),
            ref_id: ref_id.into(),
        });
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.field_config.defaults.unit = Some(unit.into());
        self
    }

    pub fn min_max(mut self, min: f64, max: f64) -> Self {
        self.field_config.defaults.min = Some(min);
        self.field_config.defaults.max = Some(max);
        self
    }

    pub fn custom(mut self, custom: CustomStyle) -> Self {
        self.field_config.defaults.custom = Some(custom);
        self
    }

    pub fn color(mut self, color: ColorConfig) -> Self {
        self.field_config.defaults.color = Some(color);
        self
    }

    pub fn thresholds(mut self, thresholds: Thresholds) -> Self {
        self.field_config.defaults.thresholds = Some(thresholds);
        self
    }

    pub fn override_field(mut self, field_name: impl Into<String>, properties: Vec<OverrideProperty>) -> Self {
        self.field_config.overrides.push(FieldOverride {
            matcher: FieldMatcher {
                id: "byName".to_string(),
                options: field_name.into(),
            },
            properties,
        });
        self
    }

    pub fn options(mut self, options: PanelOptions) -> Self {
        self.options = options;
        self
    }

    /// 하단 목록형 범례
    pub fn bottom_legend(mut self) -> Self {
        self.options.legend = Some(Legend::bottom_list());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPos {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl GridPos {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
}

/// 패널 쿼리.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub datasource: DatasourceRef,
    pub query: String,
    pub ref_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasourceRef {
    #[serde(rename = "type")]
    pub kind: String,
    pub uid: String,
}

impl DatasourceRef {
    pub fn influxdb() -> Self {
        Self {
            kind: "influxdb".to_string(),
            uid: INFLUXDB_DATASOURCE_UID.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub defaults: FieldDefaults,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<FieldOverride>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Thresholds>,
}

/// 선 그래프 스타일.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomStyle {
    pub draw_style: String,
    pub line_interpolation: String,
    pub fill_opacity: u32,
    pub line_width: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_points: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axis_placement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stacking: Option<Stacking>,
}

impl CustomStyle {
    /// 부드러운 선, 두께 2
    pub fn smooth_line(fill_opacity: u32) -> Self {
        Self {
            draw_style: "line".to_string(),
            line_interpolation: "smooth".to_string(),
            fill_opacity,
            line_width: 2,
            show_points: None,
            axis_placement: None,
            stacking: None,
        }
    }

    pub fn hide_points(mut self) -> Self {
        self.show_points = Some("never".to_string());
        self
    }

    pub fn axis_auto(mut self) -> Self {
        self.axis_placement = Some("auto".to_string());
        self
    }

    pub fn stacked(mut self) -> Self {
        self.stacking = Some(Stacking {
            mode: "normal".to_string(),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stacking {
    pub mode: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorConfig {
    pub mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_color: Option<String>,
}

impl ColorConfig {
    pub fn palette_classic() -> Self {
        Self {
            mode: "palette-classic".to_string(),
            fixed_color: None,
        }
    }

    pub fn fixed(color: impl Into<String>) -> Self {
        Self {
            mode: "fixed".to_string(),
            fixed_color: Some(color.into()),
        }
    }
}

/// 임계값 단계.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub mode: String,
    pub steps: Vec<ThresholdStep>,
}

impl Thresholds {
    /// 절대값 기준 임계값. 첫 단계는 기준값 없음(`null`)입니다.
    pub fn absolute(base_color: &str, steps: &[(&str, f64)]) -> Self {
        let mut all = vec![ThresholdStep {
            color: base_color.to_string(),
            value: None,
        }];
        all.extend(steps.iter().map(|(color, value)| ThresholdStep {
            color: color.to_string(),
            value: Some(*value),
        }));
        Self {
            mode: "absolute".to_string(),
            steps: all,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdStep {
    pub color: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOverride {
    pub matcher: FieldMatcher,
    pub properties: Vec<OverrideProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMatcher {
    pub id: String,
    pub options: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideProperty {
    pub id: String,
    pub value: serde_json::Value,
}

impl OverrideProperty {
    pub fn new(id: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }
}

/// 패널 표시 옵션.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_threshold_labels: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_threshold_markers: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justify_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_mode: Option<String>,
}

impl PanelOptions {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// 게이지 임계값 마커 표시
    pub fn gauge_markers() -> Self {
        Self {
            show_threshold_labels: Some(false),
            show_threshold_markers: Some(true),
            ..Self::default()
        }
    }

    /// 그래프 없이 값만 표시하는 stat
    pub fn stat_value() -> Self {
        Self {
            color_mode: Some("value".to_string()),
            graph_mode: Some("none".to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Legend {
    pub display_mode: String,
    pub placement: String,
}

impl Legend {
    pub fn bottom_list() -> Self {
        Self {
            display_mode: "list".to_string(),
            placement: "bottom".to_string(),
        }
    }
}
