use crate::schema::MetricDescriptor;
use serde::{Deserialize, Serialize};
use ucdn_core::{ExporterError, Result};

/// One reduced gauge value with its label values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReducedObservation {
    pub fq_name: String,
    pub value: f64,
    pub label_values: Vec<String>,
}

/// Destination of scrape results.
///
/// `describe` receives the fixed catalog before any observation of a scrape.
/// `observe_resource` is then called once per resource with every value it
/// produced; a sink records either all of them or none.
pub trait MetricSink {
    fn describe(&mut self, descriptors: &[MetricDescriptor]) -> Result<()>;

    fn observe_resource(&mut self, label_values: &[&str], values: &[(&MetricDescriptor, f64)]) -> Result<()>;
}

pub fn check_labels(descriptor: &MetricDescriptor, label_values: &[&str]) -> Result<()> {
    if descriptor.label_names.len() != label_values.len() {
        return Err(ExporterError::LabelMismatch {
            metric: descriptor.fq_name.clone(),
            expected: descriptor.label_names.len(),
            actual: label_values.len(),
        });
    }
    Ok(())
}

/// Keeps observations in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemorySink {
    descriptors: Vec<MetricDescriptor>,
    observations: Vec<ReducedObservation>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn descriptors(&self) -> &[MetricDescriptor] {
        &self.descriptors
    }

    pub fn observations(&self) -> &[ReducedObservation] {
        &self.observations
    }

    /// First observation of `fq_name` carrying `label_value`.
    pub fn value_of(&self, fq_name: &str, label_value: &str) -> Option<f64> {
        self.observations
            .iter()
            .find(|o| o.fq_name == fq_name && o.label_values.iter().any(|l| l == label_value))
            .map(|o| o.value)
    }
}

impl MetricSink for MemorySink {
    fn describe(&mut self, descriptors: &[MetricDescriptor]) -> Result<()> {
        self.descriptors = descriptors.to_vec();
        Ok(())
    }

    fn observe_resource(&mut self, label_values: &[&str], values: &[(&MetricDescriptor, f64)]) -> Result<()> {
        for (descriptor, _) in values {
            check_labels(descriptor, label_values)?;
        }

        let labels: Vec<String> = label_values.iter().map(|l| l.to_string()).collect();
        self.observations
            .extend(values.iter().map(|(descriptor, value)| ReducedObservation {
                fq_name: descriptor.fq_name.clone(),
                value: *value,
                label_values: labels.clone(),
            }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{define_metric, RESOURCE_LABEL};

    #[test]
    fn test_memory_sink_records() {
        let bandwidth = define_metric("uCloud", "cdn", "band_width", "bw", &[RESOURCE_LABEL]);
        let p95 = define_metric("uCloud", "cdn", "95_band_width", "p95", &[RESOURCE_LABEL]);
        let mut sink = MemorySink::new();

        sink.describe(&[bandwidth.clone(), p95.clone()]).unwrap();
        sink.observe_resource(&["example.com"], &[(&bandwidth, 12.5), (&p95, 30.0)])
            .unwrap();

        assert_eq!(sink.descriptors().len(), 2);
        assert_eq!(sink.observations().len(), 2);
        assert_eq!(sink.value_of("uCloud_cdn_band_width", "example.com"), Some(12.5));
        assert_eq!(sink.value_of("uCloud_cdn_95_band_width", "example.com"), Some(30.0));
        assert_eq!(sink.value_of("uCloud_cdn_band_width", "other.com"), None);
    }

    #[test]
    fn test_label_arity_enforced() {
        let descriptor = define_metric("uCloud", "cdn", "band_width", "bw", &[RESOURCE_LABEL]);
        let mut sink = MemorySink::new();

        let err = sink.observe_resource(&[], &[(&descriptor, 1.0)]).unwrap_err();
        assert!(matches!(
            err,
            ExporterError::LabelMismatch {
                expected: 1,
                actual: 0,
                ..
            }
        ));

        assert!(sink.observe_resource(&["a", "b"], &[(&descriptor, 1.0)]).is_err());
        assert!(sink.observations().is_empty());
    }

    #[test]
    fn test_rejected_resource_records_nothing() {
        let good = define_metric("uCloud", "cdn", "band_width", "bw", &[RESOURCE_LABEL]);
        let two_labels = define_metric("uCloud", "cdn", "pair", "pair", &[RESOURCE_LABEL, "region"]);
        let mut sink = MemorySink::new();

        assert!(sink
            .observe_resource(&["example.com"], &[(&good, 1.0), (&two_labels, 2.0)])
            .is_err());
        assert!(sink.observations().is_empty());
    }
}
