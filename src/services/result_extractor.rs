//! 结果解析服务 - 业务能力层
//!
//! 纯 HTML → 结构化数据，不发请求

use crate::error::{AppResult, DataShapeError};
use crate::models::{StatusEvent, TrackingRow};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

const ROW_ACTION_SELECTOR: &str = "tr[onclick]";
const STATUS_TEXT_SELECTOR: &str = "tr > td > font";
const QUOTED_REFERENCE: &str = r"'([^']*)'";

/// 每条可见历史记录在文本流中占 3 个位置：日期、状态、无意义的第三列
const SLOTS_PER_EVENT: usize = 3;

fn selector(css: &'static str) -> AppResult<Selector> {
    Selector::parse(css).map_err(|e| DataShapeError::pattern(css, e).into())
}

/// 解析结果列表页
///
/// 每个带 `onclick` 的表格行产出一条记录：
/// 追踪编码取 action 中第一对单引号之间的内容，标签取同一行第一个单元格的文本。
pub fn extract_listing(html: &str) -> AppResult<Vec<TrackingRow>> {
    let row_selector = selector(ROW_ACTION_SELECTOR)?;
    let quoted = Regex::new(QUOTED_REFERENCE)
        .map_err(|e| DataShapeError::pattern(QUOTED_REFERENCE, e))?;
    let document = Html::parse_document(html);

    let mut rows = Vec::new();
    for (index, row) in document.select(&row_selector).enumerate() {
        let position = index + 1;
        let action = row.value().attr("onclick").unwrap_or_default();

        let reference = quoted
            .captures(action)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| DataShapeError::MalformedRowAction {
                row: position,
                action: action.to_string(),
            })?;

        let package_label = first_cell_text(row)
            .ok_or(DataShapeError::ListingLabelMissing { row: position })?;

        rows.push(TrackingRow {
            reference,
            package_label,
        });
    }

    Ok(rows)
}

/// 同一行第一个 `td` 的直接文本
fn first_cell_text(row: ElementRef<'_>) -> Option<String> {
    let cell = row
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| child.value().name() == "td")?;

    let text: String = cell
        .children()
        .filter_map(|node| node.value().as_text().map(|t| &**t))
        .collect();
    let text = text.trim();

    (!text.is_empty()).then(|| text.to_string())
}

/// 解析包裹详情页，得到按页面顺序排列的状态历史
pub fn extract_detail(html: &str) -> AppResult<Vec<StatusEvent>> {
    Ok(group_status_events(extract_status_text(html)?))
}

/// 收集 `tr > td > font` 下的直接文本节点，去空白后丢弃空节点
pub fn extract_status_text(html: &str) -> AppResult<Vec<String>> {
    let font_selector = selector(STATUS_TEXT_SELECTOR)?;
    let document = Html::parse_document(html);

    let nodes = document
        .select(&font_selector)
        .flat_map(|font| {
            font.children()
                .filter_map(|node| node.value().as_text().map(|t| t.trim().to_string()))
                .collect::<Vec<_>>()
        })
        .filter(|text| !text.is_empty())
        .collect();

    Ok(nodes)
}

/// 按 3 个一组把文本流切成状态记录
///
/// 位置从 1 开始计数：`k % 3 == 1` 开始新记录（日期），`k % 3 == 2` 为状态，
/// `k % 3 == 0` 丢弃并结束记录。末尾不完整的一组被丢弃，因此 N 个节点产出 ⌊N/3⌋ 条。
pub fn group_status_events<I>(nodes: I) -> Vec<StatusEvent>
where
    I: IntoIterator<Item = String>,
{
    let mut events = Vec::new();
    let mut date = None;
    let mut status = None;

    for (index, text) in nodes.into_iter().enumerate() {
        match (index + 1) % SLOTS_PER_EVENT {
            1 => {
                date = Some(text);
                status = None;
            }
            2 => status = Some(text),
            _ => {
                if let (Some(date), Some(status)) = (date.take(), status.take()) {
                    events.push(StatusEvent { date, status });
                }
            }
        }
    }

    events
}
