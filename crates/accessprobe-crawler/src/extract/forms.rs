//! Form controls: labelling, radio grouping, and required-field hints.

use serde::Deserialize;

use super::{run_script, Category};
use crate::browser::PageProbe;
use crate::error::ExtractError;
use crate::model::{ElementRecord, FormAnalysis, FormSummary};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawInput {
    element: ElementRecord,
    /// A `label[for]` points at this control's `id`.
    #[serde(default)]
    has_label_for: bool,
    #[serde(default)]
    in_fieldset: bool,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawForms {
    #[serde(default)]
    inputs: Vec<RawInput>,
    #[serde(default)]
    forms: Vec<FormSummary>,
}

fn is_labelled(input: &RawInput) -> bool {
    input.has_label_for
        || input.element.non_empty_attr("aria-label").is_some()
        || input.element.non_empty_attr("aria-labelledby").is_some()
}

fn is_radio(element: &ElementRecord) -> bool {
    element.tag_name == "input"
        && element
            .attr("type")
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("radio"))
}

/// Radios sharing a `name`, in order of first appearance.
fn radio_groups(inputs: &[RawInput]) -> Vec<(&str, Vec<&RawInput>)> {
    let mut groups: Vec<(&str, Vec<&RawInput>)> = Vec::new();
    for input in inputs.iter().filter(|i| is_radio(&i.element)) {
        let Some(name) = input.element.non_empty_attr("name") else {
            continue;
        };
        match groups.iter_mut().find(|(n, _)| *n == name) {
            Some((_, members)) => members.push(input),
            None => groups.push((name, vec![input])),
        }
    }
    groups
}

pub(crate) fn classify(raw: RawForms) -> FormAnalysis {
    let unlabeled_inputs = raw
        .inputs
        .iter()
        .filter(|i| !is_labelled(i))
        .map(|i| i.element.clone())
        .collect();

    let missing_required = raw
        .inputs
        .iter()
        .filter(|i| {
            i.element.has_attr("required") && i.element.non_empty_attr("aria-required").is_none()
        })
        .map(|i| i.element.clone())
        .collect();

    let missing_fieldsets = radio_groups(&raw.inputs)
        .into_iter()
        .filter(|(_, members)| members.len() > 1 && !members.iter().any(|m| m.in_fieldset))
        .flat_map(|(_, members)| members.into_iter().map(|m| m.element.clone()))
        .collect();

    FormAnalysis {
        unlabeled_inputs,
        missing_fieldsets,
        missing_required,
        forms: raw.forms,
        ..Default::default()
    }
}

pub async fn extract(probe: &dyn PageProbe) -> Result<FormAnalysis, ExtractError> {
    let raw: RawForms = run_script(probe, Category::Forms).await?;
    Ok(classify(raw))
}
