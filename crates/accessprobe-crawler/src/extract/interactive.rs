//! Focusable and clickable elements with their touch-target geometry.

use super::{run_script, Category};
use crate::browser::PageProbe;
use crate::error::ExtractError;
use crate::model::{Dimensions, ElementRecord, InteractiveElementRecord};

/// Minimum touch target edge, in CSS pixels.
pub const MIN_TOUCH_TARGET_PX: f64 = 44.0;

pub(crate) fn meets_touch_target(size: Dimensions) -> bool {
    size.width >= MIN_TOUCH_TARGET_PX && size.height >= MIN_TOUCH_TARGET_PX
}

pub(crate) fn classify_element(element: ElementRecord) -> InteractiveElementRecord {
    let tab_index_attr = element.attr("tabindex");
    let touch_target_size: Dimensions = element.bounding_box.unwrap_or_default().into();

    InteractiveElementRecord {
        is_focusable: tab_index_attr != Some("-1"),
        has_visible_focus: true,
        tab_index: tab_index_attr.and_then(|t| t.trim().parse().ok()),
        role: element.non_empty_attr("role").map(str::to_string),
        aria_label: element.non_empty_attr("aria-label").map(str::to_string),
        aria_described_by: element
            .non_empty_attr("aria-describedby")
            .map(str::to_string),
        meets_touch_target_size: meets_touch_target(touch_target_size),
        touch_target_size,
        element,
    }
}

pub async fn extract(probe: &dyn PageProbe) -> Result<Vec<InteractiveElementRecord>, ExtractError> {
    let elements: Vec<ElementRecord> = run_script(probe, Category::Interactive).await?;
    Ok(elements.into_iter().map(classify_element).collect())
}
