use roxmltree::{Document, Node};
use tracing::debug;

use regtest_core::{coerce, MetricSet, MetricValue};

use crate::error::{DocumentLevel, ExtractError};
use crate::profile::ExtractionProfile;

/// Turns one domain XML document into a canonical [`MetricSet`].
///
/// Stateless apart from its profile; safe to share between threads.
#[derive(Debug, Clone, Default)]
pub struct MetricExtractor {
    profile: ExtractionProfile,
}

impl MetricExtractor {
    pub fn new(profile: ExtractionProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &ExtractionProfile {
        &self.profile
    }

    /// Extract metrics from `xml`.
    ///
    /// The container is searched in the outer document first. If it is absent
    /// and the profile names an embed tag, that element's text is parsed as a
    /// second document and searched instead.
    pub fn extract(&self, xml: &str) -> Result<MetricSet, ExtractError> {
        let outer = parse(xml, DocumentLevel::Outer)?;
        if let Some(container) = self.find_container(&outer) {
            debug!(container = container.tag_name().name(), "payload in outer document");
            return self.read_payload(&outer, container);
        }

        let Some(embed_tag) = self.profile.embed_tag.as_deref() else {
            return Err(ExtractError::Schema(format!(
                "no {} element found",
                self.profile.container_label()
            )));
        };
        let embed = outer
            .descendants()
            .find(|n| n.has_tag_name(embed_tag))
            .ok_or_else(|| {
                ExtractError::Schema(format!(
                    "neither {} nor <{embed_tag}> element found",
                    self.profile.container_label()
                ))
            })?;
        let text = embed
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ExtractError::Schema(format!("<{embed_tag}> element is empty")))?;

        let inner = parse(text, DocumentLevel::Embedded)?;
        let container = self.find_container(&inner).ok_or_else(|| {
            ExtractError::Schema(format!(
                "no {} element in <{embed_tag}> content",
                self.profile.container_label()
            ))
        })?;
        debug!(
            container = container.tag_name().name(),
            embed = embed_tag,
            "payload in embedded document"
        );
        self.read_payload(&inner, container)
    }

    fn find_container<'a, 'input>(&self, doc: &'a Document<'input>) -> Option<Node<'a, 'input>> {
        self.profile.container.iter().find_map(|tag| {
            doc.descendants()
                .find(|n| n.is_element() && n.has_tag_name(tag.as_str()))
        })
    }

    fn read_payload(&self, doc: &Document<'_>, container: Node<'_, '_>) -> Result<MetricSet, ExtractError> {
        let mut metrics = MetricSet::new();

        if self.profile.leaves.is_empty() {
            self.collect_children(container, &mut metrics)?;
            if metrics.is_empty() && !self.has_samples(doc) {
                return Err(ExtractError::Schema(format!(
                    "<{}> has no content",
                    container.tag_name().name()
                )));
            }
        } else {
            let parent = container.tag_name().name();
            for tag in &self.profile.leaves {
                let text = required_text(container, tag, parent)?;
                metrics.insert(tag.clone(), self.coerce_field(tag, text)?)?;
            }
        }

        if let Some(sample_tag) = self.profile.sample_tag.as_deref() {
            for sample in doc.descendants().filter(|n| n.has_tag_name(sample_tag)) {
                let record = self.read_sample(sample)?;
                metrics.push_sample(sample_tag, record)?;
            }
        }

        debug!(metrics = metrics.len(), "extraction complete");
        Ok(metrics)
    }

    fn has_samples(&self, doc: &Document<'_>) -> bool {
        self.profile
            .sample_tag
            .as_deref()
            .is_some_and(|tag| doc.descendants().any(|n| n.has_tag_name(tag)))
    }

    fn read_sample(&self, sample: Node<'_, '_>) -> Result<MetricSet, ExtractError> {
        let mut record = MetricSet::new();
        if self.profile.sample_fields.is_empty() {
            self.collect_children(sample, &mut record)?;
            return Ok(record);
        }

        let parent = sample.tag_name().name();
        for alternatives in &self.profile.sample_fields {
            let Some((tag, node)) = alternatives
                .iter()
                .find_map(|tag| child_element(sample, tag).map(|n| (tag, n)))
            else {
                return Err(ExtractError::Schema(format!(
                    "a <{parent}> element is missing <{}>",
                    alternatives.join("|")
                )));
            };
            let text = non_empty_text(node)
                .ok_or_else(|| ExtractError::Schema(format!("<{tag}> in <{parent}> is empty")))?;
            record.insert(tag.clone(), self.coerce_field(tag, text)?)?;
        }
        Ok(record)
    }

    /// Collect every element child: leaves become metrics, elements with
    /// children become records appended under their tag.
    fn collect_children(&self, node: Node<'_, '_>, into: &mut MetricSet) -> Result<(), ExtractError> {
        let sample_tag = self.profile.sample_tag.as_deref();
        for child in node.children().filter(|c| c.is_element()) {
            let tag = child.tag_name().name();
            if Some(tag) == sample_tag {
                continue;
            }
            if child.children().any(|c| c.is_element()) {
                let mut record = MetricSet::new();
                self.collect_children(child, &mut record)?;
                into.push_sample(tag, record)?;
            } else {
                let value = self.coerce_field(tag, child.text().unwrap_or_default())?;
                into.insert(tag, value)?;
            }
        }
        Ok(())
    }

    fn coerce_field(&self, tag: &str, text: &str) -> Result<MetricValue, ExtractError> {
        let value = coerce(text);
        if self.profile.is_numeric(tag) && value.as_number().is_none() {
            return Err(ExtractError::Conversion(format!(
                "<{tag}> value '{}' is not numeric",
                text.trim()
            )));
        }
        Ok(value)
    }
}

fn parse(text: &str, level: DocumentLevel) -> Result<Document<'_>, ExtractError> {
    Document::parse(text).map_err(|e| ExtractError::Parse {
        level,
        message: e.to_string(),
    })
}

fn child_element<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|c| c.is_element() && c.has_tag_name(tag))
}

fn non_empty_text<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.text().map(str::trim).filter(|t| !t.is_empty())
}

fn required_text<'a>(container: Node<'a, '_>, tag: &str, parent: &str) -> Result<&'a str, ExtractError> {
    let node = child_element(container, tag)
        .ok_or_else(|| ExtractError::Schema(format!("missing <{tag}> element in <{parent}>")))?;
    non_empty_text(node).ok_or_else(|| ExtractError::Schema(format!("<{tag}> in <{parent}> is empty")))
}
