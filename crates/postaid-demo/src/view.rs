#![forbid(unsafe_code)]

//! Plain-text rendering of the app model.
//!
//! Matched text is wrapped in `[` `]`. Expanded buildings show a `▾` marker
//! and their residents; collapsed ones show `▸`.

use std::fmt::Write as _;
use std::ops::Range;

use postaid::route::{Drawn, LabelStyle};
use postaid::{
    DatabaseSummary, Forecast, MapSurface, Mode, Query, SearchScope, Section, match_ranges,
};

use crate::app::{AppModel, Tab};

const RULE: &str = "────────────────────────────────────────";

pub fn render(model: &AppModel, out: &mut String) {
    render_tabs(model.tab(), out);
    if let Some(notice) = model.notice() {
        for line in notice.lines() {
            let _ = writeln!(out, "  {line}");
        }
        out.push_str(RULE);
        out.push('\n');
    }
    match model.tab() {
        Tab::List => {
            render_weather(model.forecast(), model.weather_pending(), out);
            render_list(model, out);
        }
        Tab::Database => render_database(model, out),
        Tab::Map => render_map(model, out),
    }
}

fn render_tabs(active: Tab, out: &mut String) {
    let tabs: Vec<String> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            if *tab == active {
                format!("[{} {}]", i + 1, tab.title())
            } else {
                format!(" {} {} ", i + 1, tab.title())
            }
        })
        .collect();
    let _ = writeln!(out, "{}", tabs.join(" "));
    out.push_str(RULE);
    out.push('\n');
}

fn render_weather(forecast: Option<&Forecast>, pending: bool, out: &mut String) {
    let Some(f) = forecast else {
        if pending {
            out.push_str("오늘의 날씨: 불러오는 중...\n\n");
        }
        return;
    };
    let origin = if f.is_fallback() { " (예상치)" } else { "" };
    let _ = writeln!(out, "오늘의 날씨 · {} · {}{origin}", f.date, f.location);
    for (label, half) in [("오전", &f.am), ("오후", &f.pm)] {
        let _ = writeln!(
            out,
            "  {label} {} {:<2} {:>5}  강수 {}",
            half.status.icon(),
            half.status.label(),
            half.temp_label(),
            half.rain_label()
        );
    }
    let _ = writeln!(out, "  💡 {}", f.advice_text());
    if let Some(updated) = &f.last_updated {
        let _ = writeln!(out, "  발표 {updated}");
    }
    out.push('\n');
}

fn scope_label(scope: SearchScope) -> &'static str {
    match scope {
        SearchScope::All => "전체",
        SearchScope::Building => "건물",
        SearchScope::Tenant => "이름",
        SearchScope::Unit => "호수",
    }
}

fn render_list(model: &AppModel, out: &mut String) {
    let search = model.search();
    let view = search.view(model.records(), model.order());
    if view.query_active {
        let _ = writeln!(
            out,
            "검색: \"{}\" ({}) · {}건",
            search.raw_query().trim(),
            scope_label(search.scope()),
            view.match_count
        );
    } else {
        let _ = writeln!(out, "전체 {}명 ({})", view.match_count, scope_label(search.scope()));
    }

    if view.sections.is_empty() {
        out.push_str("  검색 결과가 없습니다.\n");
        return;
    }
    let query = search.query();
    for (i, section) in view.sections.iter().enumerate() {
        render_section(i + 1, section, query, search.scope(), out);
    }
}

fn render_section(
    number: usize,
    section: &Section<'_>,
    query: Option<&Query>,
    scope: SearchScope,
    out: &mut String,
) {
    let marker = if section.expanded { '▾' } else { '▸' };
    let name = match query {
        Some(q) if scope_covers(scope, SearchScope::Building) => {
            highlight(&section.building, &match_ranges(&section.building, q, true))
        }
        _ => section.building.clone(),
    };
    let _ = writeln!(out, "{number:>2} {marker} {name} · {}", section.members.len());
    if !section.expanded {
        return;
    }
    if section.members.is_empty() {
        out.push_str("      (데이터 없음)\n");
        return;
    }
    for r in &section.members {
        let (unit, tenant) = match query {
            Some(q) => (
                field(&r.unit_number, q, false, scope_covers(scope, SearchScope::Unit)),
                field(&r.tenant, q, true, scope_covers(scope, SearchScope::Tenant)),
            ),
            None => (r.unit_number.clone(), r.tenant.clone()),
        };
        let _ = writeln!(out, "      {unit:<8} {tenant}  {}", r.id);
        // residents filed under overflow keep their own building label
        if section.overflow {
            let _ = writeln!(out, "               ({})", r.building_name);
        }
    }
}

fn scope_covers(scope: SearchScope, field: SearchScope) -> bool {
    scope == SearchScope::All || scope == field
}

fn field(text: &str, query: &Query, with_initials: bool, in_scope: bool) -> String {
    if in_scope {
        highlight(text, &match_ranges(text, query, with_initials))
    } else {
        text.to_owned()
    }
}

/// Program log lines, shown above the next screen.
pub fn render_logs(lines: &[String], out: &mut String) {
    for line in lines {
        let _ = writeln!(out, "* {line}");
    }
}

/// Wrap each byte range of `text` in brackets. Ranges are sorted and disjoint.
pub fn highlight(text: &str, ranges: &[Range<usize>]) -> String {
    let mut out = String::with_capacity(text.len() + ranges.len() * 2);
    let mut cursor = 0;
    for range in ranges {
        let (Some(before), Some(hit)) = (text.get(cursor..range.start), text.get(range.clone()))
        else {
            continue;
        };
        out.push_str(before);
        out.push('[');
        out.push_str(hit);
        out.push(']');
        cursor = range.end;
    }
    out.push_str(text.get(cursor..).unwrap_or_default());
    out
}

fn render_database(model: &AppModel, out: &mut String) {
    let summary = DatabaseSummary::of(model.records());
    let _ = writeln!(
        out,
        "총 세대 {} · 등록 건물 {}",
        summary.total, summary.buildings
    );
    out.push_str(RULE);
    out.push('\n');
    if model.records().is_empty() {
        out.push_str("  등록된 데이터가 없습니다.\n");
        return;
    }
    let _ = writeln!(out, "{:<5} {:<24} {:<8} 수취인", "ID", "배달지 주소", "호수");
    for r in model.records() {
        let _ = writeln!(
            out,
            "{:<5} {:<24} {:<8} {}",
            r.id.to_string(),
            r.building_name,
            r.unit_number,
            r.tenant
        );
    }
}

fn render_map(model: &AppModel, out: &mut String) {
    let route = model.route();
    let mode = match route.mode() {
        Mode::Viewing => "보기",
        Mode::Editing => "편집 중",
    };
    let surface = route.surface();
    let _ = writeln!(
        out,
        "배달 경로 · {mode} · {}개 지점 · 중심 {}",
        route.len(),
        surface.center()
    );
    if route.is_empty() {
        out.push_str("  경로가 없습니다. 'route add'로 지점을 추가하세요.\n");
        return;
    }
    for (i, point) in route.points().iter().enumerate() {
        let _ = writeln!(out, "  {:>2}. {:<10} {}", i + 1, point.name, point.position);
    }

    let mut markers = 0;
    let mut chips = 0;
    let mut pins = 0;
    for (_, drawn) in surface.items() {
        match drawn {
            Drawn::Marker { .. } => markers += 1,
            Drawn::Label {
                style: LabelStyle::Chip,
                ..
            } => chips += 1,
            Drawn::Label {
                style: LabelStyle::Pin,
                ..
            } => pins += 1,
            Drawn::Polyline { .. } => {}
        }
    }
    let line = surface.polyline().map_or(0, <[_]>::len);
    let _ = writeln!(
        out,
        "  지도: 경로선 {line}점 · 마커 {markers} · 편집 라벨 {chips} · 라벨 {pins}"
    );
}
