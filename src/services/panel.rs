//! 계획 페이지의 패널 단계
//!
//! ```text
//! SelectingTrip ──next──▶ DurationChoice ──next──▶ ItineraryEditing
//!               ◀──back──                ◀──back──
//! ```

use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    /// 여행 선택
    #[default]
    SelectingTrip,
    /// 여행 기간 선택
    DurationChoice,
    /// 일자별 일정 편집
    ItineraryEditing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelAction {
    Next,
    Back,
}

impl Panel {
    /// 다음 단계. 양 끝을 넘어가면 검증 실패입니다.
    pub fn apply(self, action: PanelAction) -> Result<Panel, AppError> {
        use Panel::*;
        match (self, action) {
            (SelectingTrip, PanelAction::Next) => Ok(DurationChoice),
            (DurationChoice, PanelAction::Next) => Ok(ItineraryEditing),
            (DurationChoice, PanelAction::Back) => Ok(SelectingTrip),
            (ItineraryEditing, PanelAction::Back) => Ok(DurationChoice),
            (SelectingTrip, PanelAction::Back) => Err(AppError::validation(
                "panel",
                "Already at the first step",
            )),
            (ItineraryEditing, PanelAction::Next) => Err(AppError::validation(
                "panel",
                "Already at the last step",
            )),
        }
    }
}
