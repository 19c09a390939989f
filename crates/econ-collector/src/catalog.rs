//! 수집 대상 목록.
//!
//! 일일 수집과 히스토리 수집이 같은 종목 이름을 사용해야 대시보드 쿼리가
//! 두 데이터를 하나의 시리즈로 봅니다.

use econ_core::IndicatorPeriod;
use econ_data::EcosCycle;

/// 뉴스 검색 키워드
pub const NEWS_KEYWORDS: &[&str] = &["경제", "부동산", "반도체", "코스피"];

/// 한국 종목 (이름, 티커)
pub const KR_TICKERS: &[(&str, &str)] = &[
    // 지수
    ("코스피", "^KS11"),
    ("코스닥", "^KQ11"),
    // ETF
    ("KODEX200", "069500.KS"),
    ("KODEX 코스닥150", "229200.KS"),
    ("TIGER 미국S&P500", "360750.KS"),
    ("TIGER 미국나스닥100", "133690.KS"),
    ("KODEX 배당가치", "227560.KS"),
    ("TIGER 코리아배당다우존스", "269370.KS"),
    ("KODEX 국고채3년", "114260.KS"),
    ("KODEX 골드선물(H)", "132030.KS"),
    ("KODEX 미국S&P500커버드콜OTM", "453530.KS"),
    // 개별 종목
    ("삼성전자", "005930.KS"),
    ("SK하이닉스", "000660.KS"),
    ("LG에너지솔루션", "373220.KS"),
    ("삼성바이오로직스", "207940.KS"),
    ("현대차", "005380.KS"),
    ("KB금융", "105560.KS"),
    ("POSCO홀딩스", "005490.KS"),
    ("NAVER", "035420.KS"),
    ("HYBE", "352820.KS"),
    ("SM", "041510.KS"),
    ("JYP Ent.", "035900.KS"),
    ("크래프톤", "259960.KS"),
    ("엔씨소프트", "036570.KS"),
    ("CJ ENM", "035760.KS"),
    ("CGV", "079160.KS"),
    ("카카오", "035720.KS"),
];

/// 미국 종목 (이름, 티커)
pub const US_TICKERS: &[(&str, &str)] = &[
    // 지수
    ("S&P500", "^GSPC"),
    ("나스닥", "^IXIC"),
    ("VIX", "^VIX"),
    // 나스닥 추종
    ("QQQ", "QQQ"),
    ("QLD (2x)", "QLD"),
    ("TQQQ (3x)", "TQQQ"),
    // S&P500 추종
    ("SPY", "SPY"),
    ("VOO", "VOO"),
    ("IVV", "IVV"),
    ("SSO (2x)", "SSO"),
    ("UPRO (3x)", "UPRO"),
    ("SPLG", "SPLG"),
    ("DIA", "DIA"),
    // 배당/인컴
    ("SCHD", "SCHD"),
    ("DGRO", "DGRO"),
    ("SPHD", "SPHD"),
    ("JEPI", "JEPI"),
    ("NUSI", "NUSI"),
    ("MAIN", "MAIN"),
    ("GAIN", "GAIN"),
    ("QYLD", "QYLD"),
    ("XYLD", "XYLD"),
    ("RYLD", "RYLD"),
    // 섹터 레버리지
    ("SOXL (3x)", "SOXL"),
    ("TECL (3x)", "TECL"),
    // 전체 시장
    ("VTI", "VTI"),
    ("VT", "VT"),
    ("VEA", "VEA"),
    ("EFA", "EFA"),
    ("SPDW", "SPDW"),
    ("ITOT", "ITOT"),
    // 인버스
    ("SQQQ (-3x)", "SQQQ"),
    ("QID (-2x)", "QID"),
    ("PSQ (-1x)", "PSQ"),
    ("CWEB (2x)", "CWEB"),
    // 채권/원자재
    ("TLT", "TLT"),
    ("GLD", "GLD"),
];

/// FRED 시리즈 (시리즈 ID, 지표 이름)
pub const FRED_INDICATORS: &[(&str, &str)] = &[
    ("GDP", "미국 GDP"),
    ("CPIAUCSL", "미국 CPI"),
    ("UNRATE", "미국 실업률"),
    ("PAYEMS", "미국 비농업 고용자수"),
    ("DFF", "연방기금금리"),
    ("DGS10", "미국 10년 국채금리"),
    ("VIXCLS", "VIX"),
    ("INDPRO", "미국 산업생산지수"),
    ("MANEMP", "미국 제조업 고용자수"),
    ("DEXKOUS", "USD/KRW 환율"),
];

/// ECOS 통계 항목.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcosIndicator {
    pub name: &'static str,
    pub stat_code: &'static str,
    pub cycle: EcosCycle,
    /// 빈 문자열이면 통계표 전체 항목
    pub item_code: &'static str,
}

impl EcosIndicator {
    const fn new(
        name: &'static str,
        stat_code: &'static str,
        cycle: EcosCycle,
        item_code: &'static str,
    ) -> Self {
        Self {
            name,
            stat_code,
            cycle,
            item_code,
        }
    }

    pub fn has_item(&self) -> bool {
        !self.item_code.is_empty()
    }
}

/// 일일 수집 ECOS 지표
pub const ECOS_DAILY_INDICATORS: &[EcosIndicator] = &[
    EcosIndicator::new("원/달러 환율", "731Y001", EcosCycle::Daily, "0000001"),
    EcosIndicator::new("원/엔 환율", "731Y001", EcosCycle::Daily, "0000002"),
    EcosIndicator::new("원/유로 환율", "731Y001", EcosCycle::Daily, "0000003"),
    EcosIndicator::new("기준금리", "722Y001", EcosCycle::Monthly, "0101000"),
    EcosIndicator::new("두바이유 가격", "902Y007", EcosCycle::Daily, "DUBAIOIL"),
    EcosIndicator::new("금 시세", "902Y007", EcosCycle::Daily, "GOLD"),
    EcosIndicator::new("콜금리", "722Y001", EcosCycle::Daily, "0101000"),
];

/// 히스토리 수집 ECOS 지표
pub const ECOS_HISTORY_INDICATORS: &[EcosIndicator] = &[
    EcosIndicator::new("한국 소비자물가지수", "901Y009", EcosCycle::Monthly, "0"),
    EcosIndicator::new("한국 CPI 특수분류", "901Y010", EcosCycle::Monthly, "00"),
    EcosIndicator::new("한국 GDP 주요지표", "200Y102", EcosCycle::Quarterly, ""),
];

/// 전체 주가 수집 대상 (한국 → 미국 순)
pub fn all_tickers() -> impl Iterator<Item = &'static (&'static str, &'static str)> {
    KR_TICKERS.iter().chain(US_TICKERS.iter())
}

/// 히스토리 데이터셋.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoricalDataset {
    StockKr,
    StockUs,
    EconomyFred,
    EconomyEcos,
}

impl HistoricalDataset {
    pub const ALL: [HistoricalDataset; 4] = [
        Self::StockKr,
        Self::StockUs,
        Self::EconomyFred,
        Self::EconomyEcos,
    ];

    /// 파일 이름 앞부분 (`{stem}_{suffix}.csv`)
    pub fn file_stem(&self) -> &'static str {
        match self {
            Self::StockKr => "stock_kr",
            Self::StockUs => "stock_us",
            Self::EconomyFred => "economy_fred",
            Self::EconomyEcos => "economy_ecos",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::StockKr => "한국 주식",
            Self::StockUs => "미국 주식",
            Self::EconomyFred => "FRED 경제지표",
            Self::EconomyEcos => "ECOS 경제지표",
        }
    }

    pub fn file_name(&self, suffix: &str) -> String {
        format!("{}_{}.csv", self.file_stem(), suffix)
    }

    /// 지표 데이터셋의 주기 태그. 주가 데이터셋은 `None`.
    pub fn period(&self) -> Option<IndicatorPeriod> {
        match self {
            Self::EconomyFred => Some(IndicatorPeriod::Daily),
            Self::EconomyEcos => Some(IndicatorPeriod::Monthly),
            Self::StockKr | Self::StockUs => None,
        }
    }
}
