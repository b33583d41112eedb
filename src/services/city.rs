//! # 도시 이름 후보 전략
//!
//! 사용자가 입력한 위치 문자열("Paris, Île-de-France, France" 등)에서
//! 예보 API에 보낼 검색어 후보를 순서대로 만듭니다.
//! 앞 후보가 404면 다음 후보를 시도합니다.

/// 검색어를 만드는 방법 하나
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CityStrategy {
    /// 입력 그대로 (앞뒤 공백만 제거)
    ExactName,
    /// 쉼표로 나눈 첫 부분과 마지막 부분: "Paris,France"
    CountryQualified,
    /// 첫 부분에서 글자와 공백만 남김: "St. Louis 2" → "St Louis"
    AlphabeticOnly,
}

/// 기본 시도 순서
pub const DEFAULT_STRATEGIES: [CityStrategy; 3] = [
    CityStrategy::ExactName,
    CityStrategy::CountryQualified,
    CityStrategy::AlphabeticOnly,
];

impl CityStrategy {
    /// 이 전략으로 만든 검색어. 만들 수 없으면 None
    pub fn query(self, location: &str) -> Option<String> {
        let location = location.trim();
        let parts: Vec<&str> = location
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        let query = match self {
            CityStrategy::ExactName => location.to_string(),
            CityStrategy::CountryQualified => match parts.as_slice() {
                [first, .., last] => format!("{},{}", first, last),
                _ => return None,
            },
            CityStrategy::AlphabeticOnly => {
                let first = parts.first()?;
                let letters: String = first
                    .chars()
                    .filter(|c| c.is_alphabetic() || c.is_whitespace())
                    .collect();
                letters.split_whitespace().collect::<Vec<_>>().join(" ")
            }
        };

        Some(query).filter(|q| !q.is_empty())
    }
}

/// 전략 순서대로 후보를 만들고, 비어 있거나 중복된 후보는 건너뜁니다.
pub fn city_candidates(location: &str, strategies: &[CityStrategy]) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::new();
    for query in strategies.iter().filter_map(|s| s.query(location)) {
        if !candidates.contains(&query) {
            candidates.push(query);
        }
    }
    candidates
}

/// "Paris, France" → "Paris"
pub fn extract_city_name(location: &str) -> String {
    location
        .split(',')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}
