//! Reading the import job result document.
//!
//! The `data` column of an import job holds an `importexportxml` document: a
//! `solutionManifests` section describing the solution, followed by one section per
//! component kind (`entities`, `optionSets`, `workflows`, `nodes`, ...). Each component
//! carries a `<result result="success|failure" errorcode=".." errortext=".."/>` child.

use anyhow::Context;
use roxmltree::{Document, Node};

use super::naming::split_node_name;
use super::report::ReportLine;

/// Components reported by default
pub const ENTITIES_PATH: &str = "entities/entity";

/// Manifest elements echoed before the failures
pub const SOLUTION_DETAIL_ELEMENTS: [&str; 2] = ["UniqueName", "Version"];

const MANIFEST_ELEMENT: &str = "solutionManifest";
const FAILURE: &str = "failure";

/// Which components to scan for failures
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ComponentScope {
    /// Only `entities/entity`
    #[default]
    Entities,
    /// Every section whose components carry a `<result>` child
    All,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentFailure {
    /// Element name of the component, e.g. `entity`
    pub component: String,
    /// Printed name: the last segment of the selecting path
    pub label: String,
    /// Non-empty `LocalizedName` attribute, kept out of the report line
    pub localized_name: Option<String>,
    pub result: String,
    pub error_code: String,
    pub error_text: String,
}

impl ComponentFailure {
    pub fn to_report_line(&self) -> ReportLine {
        ReportLine::warn(format!(
            "{} result: {} Code: {} Description: {}",
            self.label, self.result, self.error_code, self.error_text
        ))
    }
}

pub struct ImportJobLog<'input> {
    doc: Document<'input>,
}

impl<'input> ImportJobLog<'input> {
    pub fn parse(xml: &'input str) -> anyhow::Result<Self> {
        let doc = Document::parse(xml).context("Failed to parse import job XML")?;
        Ok(Self { doc })
    }

    /// Inner text of the first `solutionManifest/<element_name>`
    pub fn solution_detail(&self, element_name: &str) -> Option<String> {
        self.doc
            .descendants()
            .filter(|n| n.has_tag_name(MANIFEST_ELEMENT))
            .flat_map(|manifest| manifest.children())
            .find(|n| n.has_tag_name(element_name))
            .map(inner_text)
    }

    pub fn solution_details(&self) -> Vec<ReportLine> {
        SOLUTION_DETAIL_ELEMENTS
            .iter()
            .filter_map(|name| {
                self.solution_detail(name).map(|text| {
                    ReportLine::info(format!("Solution {}: {}", split_node_name(name), text))
                })
            })
            .collect()
    }

    /// Failed components under a `section/component` style path, matched anywhere in the
    /// document
    pub fn failures_at(&self, path: &str) -> Vec<ComponentFailure> {
        let label = path.rsplit('/').next().unwrap_or(path);

        select_nodes(&self.doc, path)
            .into_iter()
            .filter_map(|node| {
                let first = first_element_child(node)?;
                component_failure(node, first, label)
            })
            .collect()
    }

    pub fn failures(&self, scope: ComponentScope) -> Vec<ComponentFailure> {
        match scope {
            ComponentScope::Entities => self.failures_at(ENTITIES_PATH),
            ComponentScope::All => self
                .doc
                .root_element()
                .children()
                .filter(|n| n.is_element())
                .flat_map(|section| section.children().filter(|n| n.is_element()))
                .filter_map(|node| {
                    let first = first_element_child(node).filter(|c| c.has_tag_name("result"))?;
                    component_failure(node, first, node.tag_name().name())
                })
                .collect(),
        }
    }

    /// Solution details followed by one line per failed component
    pub fn report(&self, scope: ComponentScope) -> Vec<ReportLine> {
        self.report_failures(&self.failures(scope))
    }

    /// Same as [`report`](Self::report) for failures the caller already collected
    pub fn report_failures(&self, failures: &[ComponentFailure]) -> Vec<ReportLine> {
        let mut lines = self.solution_details();
        lines.extend(failures.iter().map(ComponentFailure::to_report_line));
        lines
    }
}

/// Parse an import job document and produce the lines to show the operator
pub fn output_import_job_data(xml: &str, scope: ComponentScope) -> anyhow::Result<Vec<ReportLine>> {
    Ok(ImportJobLog::parse(xml)?.report(scope))
}

fn select_nodes<'a, 'input>(doc: &'a Document<'input>, path: &str) -> Vec<Node<'a, 'input>> {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let Some(first) = segments.next() else {
        return Vec::new();
    };

    let mut nodes: Vec<Node> = doc.descendants().filter(|n| n.has_tag_name(first)).collect();
    for segment in segments {
        nodes = nodes
            .iter()
            .flat_map(|n| n.children())
            .filter(|n| n.has_tag_name(segment))
            .collect();
    }
    nodes
}

fn first_element_child<'a, 'input>(node: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.is_element())
}

fn component_failure(component: Node, result_node: Node, label: &str) -> Option<ComponentFailure> {
    let result = result_node.attribute("result")?;
    if result != FAILURE {
        return None;
    }

    Some(ComponentFailure {
        component: component.tag_name().name().to_string(),
        label: label.to_string(),
        localized_name: component
            .attribute("LocalizedName")
            .filter(|name| !name.is_empty())
            .map(str::to_string),
        result: result.to_string(),
        error_code: result_node.attribute("errorcode").unwrap_or_default().to_string(),
        error_text: result_node.attribute("errortext").unwrap_or_default().to_string(),
    })
}

fn inner_text(node: Node) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}
