//! # 화면 조각 렌더러 (Presentation Renderers)
//!
//! 초안 상태를 HTML 조각으로 바꿉니다. 페이지는 받은 조각을 그대로 DOM에 끼워 넣습니다.
//!
//! - 입력이 같으면 출력도 바이트 단위로 같습니다.
//! - 초안을 읽기만 하고 바꾸지 않습니다.
//! - 템플릿 이름이 `.html`로 끝나므로 minijinja가 값을 자동으로 HTML 이스케이프합니다.

use chrono::{Days, NaiveDate};
use minijinja::{context, Environment};
use serde::Serialize;

use crate::{
    error::AppError,
    models::{DayDraft, TripDraft},
};

/// 활동이 없는 날에 보여줄 안내 문구
pub const EMPTY_DAY_MESSAGE: &str =
    "No activities planned for this day yet. Add an activity to get started.";

/// 일자 탭 하나
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayTab {
    pub day_number: u32,
    /// "Day 1"
    pub label: String,
    /// "Jul 1" (시작일을 모르거나 달력 범위를 넘으면 None)
    pub date_label: Option<String>,
    pub active: bool,
}

/// 일자 탭 목록을 계산합니다.
pub fn day_tabs(days: &[DayDraft], start_date: Option<NaiveDate>, active: u32) -> Vec<DayTab> {
    days.iter()
        .map(|day| DayTab {
            day_number: day.day_number,
            label: format!("Day {}", day.day_number),
            date_label: start_date
                .and_then(|start| {
                    start.checked_add_days(Days::new(u64::from(day.day_number.saturating_sub(1))))
                })
                .map(|date| date.format("%b %-d").to_string()),
            active: day.day_number == active,
        })
        .collect()
}

#[derive(Serialize)]
struct ActivityView<'a> {
    id: &'a str,
    name: &'a str,
    address: &'a str,
}

/// 알림의 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Warning,
    Error,
}

pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    /// 템플릿은 바이너리에 포함되어 있어 실행 위치와 무관합니다.
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("day_tabs.html", include_str!("../../templates/day_tabs.html"))?;
        env.add_template(
            "activity_list.html",
            include_str!("../../templates/activity_list.html"),
        )?;
        env.add_template(
            "trip_summary.html",
            include_str!("../../templates/trip_summary.html"),
        )?;
        env.add_template("notice.html", include_str!("../../templates/notice.html"))?;
        Ok(Self { env })
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String, AppError> {
        Ok(self.env.get_template(name)?.render(ctx)?)
    }

    pub fn render_day_tabs(
        &self,
        days: &[DayDraft],
        start_date: Option<NaiveDate>,
        active: u32,
    ) -> Result<String, AppError> {
        self.render(
            "day_tabs.html",
            context! { tabs => day_tabs(days, start_date, active) },
        )
    }

    /// 하루의 활동 목록. 삭제 표시된 항목은 보이지 않습니다.
    pub fn render_activity_list(&self, day: &DayDraft) -> Result<String, AppError> {
        let activities: Vec<ActivityView> = day
            .live_waypoints()
            .map(|w| ActivityView {
                id: &w.id,
                name: &w.name,
                address: &w.address,
            })
            .collect();

        self.render(
            "activity_list.html",
            context! {
                day_number => day.day_number,
                destination_city => &day.destination_city,
                activities => activities,
                empty_message => EMPTY_DAY_MESSAGE,
            },
        )
    }

    pub fn render_trip_summary(&self, trip: &TripDraft) -> Result<String, AppError> {
        let duration_label = match trip.duration_days {
            1 => "1 day".to_string(),
            n => format!("{} days", n),
        };

        self.render(
            "trip_summary.html",
            context! {
                title => &trip.title,
                start_city => &trip.start_city,
                end_city => &trip.end_city,
                start_date => trip.start_date.map(|d| d.format("%b %-d, %Y").to_string()),
                duration_label => duration_label,
                activity_count => trip.activity_count(),
            },
        )
    }

    /// 잠깐 보여주는 성공/경고/에러 알림
    pub fn render_notice(&self, kind: NoticeKind, message: &str) -> Result<String, AppError> {
        self.render("notice.html", context! { kind => kind, message => message })
    }
}
