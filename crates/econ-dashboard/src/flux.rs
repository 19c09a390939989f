//! Flux 쿼리 빌더.
//!
//! ```rust
//! use econ_dashboard::FluxQuery;
//!
//! let q = FluxQuery::new("econ_market")
//!     .dashboard_range()
//!     .measurement("stock_prices")
//!     .tag_in("name", &["코스피", "코스닥"])
//!     .field("close")
//!     .aggregate_window("1d", "last")
//!     .build();
//! assert!(q.contains(r#"r.name == "코스피" or r.name == "코스닥""#));
//! ```

/// 파이프라인 단계를 차례로 쌓는 Flux 쿼리.
#[derive(Debug, Clone)]
pub struct FluxQuery {
    bucket: String,
    stages: Vec<String>,
}

impl FluxQuery {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            stages: Vec::new(),
        }
    }

    fn stage(mut self, stage: String) -> Self {
        self.stages.push(stage);
        self
    }

    /// 대시보드 시간 범위 (`v.timeRangeStart` ~ `v.timeRangeStop`)
    pub fn dashboard_range(self) -> Self {
        self.stage("range(start: v.timeRangeStart, stop: v.timeRangeStop)".to_string())
    }

    /// 상대 시간 범위 (예: `-5m`)
    pub fn relative_range(self, start: &str) -> Self {
        self.stage(format!("range(start: {})", start))
    }

    pub fn measurement(self, name: &str) -> Self {
        self.stage(format!(
            "filter(fn: (r) => r._measurement == {})",
            quote(name)
        ))
    }

    pub fn field(self, name: &str) -> Self {
        self.fields(&[name])
    }

    /// 필드 중 하나와 일치
    pub fn fields(self, names: &[&str]) -> Self {
        let cond = any_of("_field", names);
        self.stage(format!("filter(fn: (r) => {})", cond))
    }

    pub fn tag_eq(self, tag: &str, value: &str) -> Self {
        self.tag_in(tag, &[value])
    }

    /// 태그가 값 중 하나와 일치
    pub fn tag_in(self, tag: &str, values: &[&str]) -> Self {
        let cond = any_of(tag, values);
        self.stage(format!("filter(fn: (r) => {})", cond))
    }

    /// 태그가 정규식 중 하나와 일치
    pub fn tag_matches(self, tag: &str, patterns: &[&str]) -> Self {
        let cond = patterns
            .iter()
            .map(|p| format!("r.{} =~ /{}/", tag, p.replace('/', "\\/")))
            .collect::<Vec<_>>()
            .join(" or ");
        self.stage(format!("filter(fn: (r) => {})", cond))
    }

    pub fn aggregate_window(self, every: &str, func: &str) -> Self {
        self.stage(format!(
            "aggregateWindow(every: {}, fn: {}, createEmpty: false)",
            every, func
        ))
    }

    pub fn last(self) -> Self {
        self.stage("last()".to_string())
    }

    /// 초당 변화량 (음수 제외)
    pub fn derivative_per_second(self) -> Self {
        self.stage("derivative(unit: 1s, nonNegative: true)".to_string())
    }

    /// `_value`를 식으로 바꿉니다 (예: `100.0 - r._value`).
    pub fn map_value(self, expr: &str) -> Self {
        self.stage(format!("map(fn: (r) => ({{r with _value: {}}}))", expr))
    }

    /// `_value`를 바꾸고 시리즈 이름을 고정합니다.
    pub fn map_value_as(self, expr: &str, series: &str) -> Self {
        self.stage(format!(
            "map(fn: (r) => ({{r with _value: {}, _field: {}}}))",
            expr,
            quote(series)
        ))
    }

    /// 태그 값을 시리즈 이름으로 쓰고 나머지 태그 열을 제거합니다.
    pub fn series_from_tag(self, tag: &str, drop: &[&str]) -> Self {
        let dropped = drop.iter().map(|c| quote(c)).collect::<Vec<_>>().join(", ");
        self.stage(format!("map(fn: (r) => ({{ r with _field: r.{} }}))", tag))
            .stage(format!("drop(columns: [{}])", dropped))
    }

    /// 값을 변환하고 태그 값을 시리즈 이름으로 씁니다.
    pub fn scaled_series_from_tag(self, expr: &str, tag: &str, drop: &[&str]) -> Self {
        let dropped = drop.iter().map(|c| quote(c)).collect::<Vec<_>>().join(", ");
        self.stage(format!(
            "map(fn: (r) => ({{ r with _value: {}, _field: r.{} }}))",
            expr, tag
        ))
        .stage(format!("drop(columns: [{}])", dropped))
    }

    pub fn build(&self) -> String {
        let mut query = format!("from(bucket: {})", quote(&self.bucket));
        for stage in &self.stages {
            query.push_str("\n  |> ");
            query.push_str(stage);
        }
        query
    }
}

/// Flux 문자열 리터럴.
fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

fn any_of(column: &str, values: &[&str]) -> String {
    values
        .iter()
        .map(|v| format!("r.{} == {}", column, quote(v)))
        .collect::<Vec<_>>()
        .join(" or ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_full_pipeline() {
        let query = FluxQuery::new("econ_market")
            .dashboard_range()
            .measurement("economic_indicators")
            .tag_eq("indicator", "미국 CPI")
            .field("value")
            .aggregate_window("1mo", "last")
            .series_from_tag("indicator", &["indicator", "series_id", "period"])
            .build();

        let expected = r#"from(bucket: "econ_market")
  |> range(start: v.timeRangeStart, stop: v.timeRangeStop)
  |> filter(fn: (r) => r._measurement == "economic_indicators")
  |> filter(fn: (r) => r.indicator == "미국 CPI")
  |> filter(fn: (r) => r._field == "value")
  |> aggregateWindow(every: 1mo, fn: last, createEmpty: false)
  |> map(fn: (r) => ({ r with _field: r.indicator }))
  |> drop(columns: ["indicator", "series_id", "period"])"#;
        assert_eq!(query, expected);
    }

    #[test]
    fn test_relative_range_and_map() {
        let query = FluxQuery::new("b")
            .relative_range("-5m")
            .measurement("cpu")
            .field("usage_idle")
            .last()
            .map_value("100.0 - r._value")
            .build();

        assert!(query.contains("|> range(start: -5m)"));
        assert!(query.ends_with("|> map(fn: (r) => ({r with _value: 100.0 - r._value}))"));
    }

    #[test]
    fn test_string_values_escaped() {
        let query = FluxQuery::new("b").tag_eq("name", "a\"b").build();
        assert!(query.contains(r#"r.name == "a\"b""#));
    }

    #[test]
    fn test_tag_matches() {
        let query = FluxQuery::new("b")
            .tag_matches("indicator", &["한국 GDP.*실질.*전기비", "a/b"])
            .build();
        assert!(query.contains(r"r.indicator =~ /한국 GDP.*실질.*전기비/ or r.indicator =~ /a\/b/"));
    }
}
