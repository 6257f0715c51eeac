//! Mask generation over many images.
//!
//! Every image is an independent job with its own scratch buffers. With the
//! `rayon` feature the jobs run on the global thread pool, one image per task;
//! without it they run in order on the calling thread. A failing image is
//! reported in its own slot and never stops the others.

use image::Rgba;
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use tracing::Span;

use crate::backdrop_mask::pipeline::{generate_mask_with, MaskOptions};
use crate::error::MaskError;
use crate::Image;

/// Logging context passed explicitly to batch runs
///
/// Events for every image are recorded inside `span`, so callers decide where
/// batch output goes instead of relying on shared logger state.
#[derive(Debug, Clone)]
pub struct MaskContext {
    label: String,
    span: Span,
}

impl MaskContext {
    /// Creates a context with its own `mask_batch` span.
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        let span = tracing::info_span!("mask_batch", label = %label);
        Self { label, span }
    }

    /// Creates a context that records into an existing span.
    pub fn with_span(label: impl Into<String>, span: Span) -> Self {
        Self {
            label: label.into(),
            span,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Default for MaskContext {
    fn default() -> Self {
        Self::new("masks")
    }
}

/// Outcome of one batch run, in input order
#[derive(Debug)]
pub struct BatchReport {
    results: Vec<Result<Image<Rgba<u8>>, MaskError>>,
}

impl BatchReport {
    /// Per-image results in input order
    pub fn results(&self) -> &[Result<Image<Rgba<u8>>, MaskError>] {
        &self.results
    }

    pub fn into_results(self) -> Vec<Result<Image<Rgba<u8>>, MaskError>> {
        self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|result| result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }

    /// Indices and errors of the images that could not be masked
    pub fn failures(&self) -> impl Iterator<Item = (usize, &MaskError)> {
        self.results
            .iter()
            .enumerate()
            .filter_map(|(index, result)| result.as_ref().err().map(|error| (index, error)))
    }
}

/// Runs the mask pipeline over a set of images
///
/// # Examples
///
/// ```
/// use backdrop_mask::{Image, MaskBatch, MaskContext, MaskOptions};
/// use image::Rgba;
///
/// let images: Vec<Image<Rgba<u8>>> = vec![
///     Image::from_pixel(4, 4, Rgba([255, 255, 255, 255])),
///     Image::new(0, 0),
/// ];
///
/// let batch = MaskBatch::new(MaskOptions::default());
/// let report = batch.run(&MaskContext::new("doc"), &images);
/// assert_eq!(report.succeeded(), 1);
/// assert_eq!(report.failed(), 1);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MaskBatch {
    options: MaskOptions,
}

impl MaskBatch {
    pub fn new(options: MaskOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MaskOptions {
        &self.options
    }

    /// Generates one mask per image.
    pub fn run(&self, context: &MaskContext, images: &[Image<Rgba<u8>>]) -> BatchReport {
        let _entered = context.span().enter();
        tracing::info!(images = images.len(), "generating masks");

        let results = self.generate_all(context, images);
        let report = BatchReport { results };

        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "mask batch finished"
        );
        report
    }

    #[cfg(feature = "rayon")]
    fn generate_all(
        &self,
        context: &MaskContext,
        images: &[Image<Rgba<u8>>],
    ) -> Vec<Result<Image<Rgba<u8>>, MaskError>> {
        images
            .par_iter()
            .enumerate()
            .map(|(index, image)| self.generate_one(context, index, image))
            .collect()
    }

    #[cfg(not(feature = "rayon"))]
    fn generate_all(
        &self,
        context: &MaskContext,
        images: &[Image<Rgba<u8>>],
    ) -> Vec<Result<Image<Rgba<u8>>, MaskError>> {
        images
            .iter()
            .enumerate()
            .map(|(index, image)| self.generate_one(context, index, image))
            .collect()
    }

    fn generate_one(
        &self,
        context: &MaskContext,
        index: usize,
        image: &Image<Rgba<u8>>,
    ) -> Result<Image<Rgba<u8>>, MaskError> {
        // Worker threads do not inherit the caller's entered span
        let _entered = context.span().enter();
        let result = generate_mask_with(image, &self.options);
        if let Err(error) = &result {
            tracing::warn!(index, %error, "skipping image");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failures_are_isolated() {
        let images: Vec<Image<Rgba<u8>>> = vec![
            Image::from_pixel(3, 3, Rgba([0, 0, 0, 255])),
            Image::new(0, 2),
            Image::from_pixel(5, 2, Rgba([9, 9, 9, 255])),
        ];

        let report = MaskBatch::default().run(&MaskContext::default(), &images);

        assert_eq!(report.len(), 3);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures, vec![(1, &MaskError::EmptyImage)]);
        assert_eq!(
            report.results()[2].as_ref().map(|mask| mask.dimensions()),
            Ok((5, 2))
        );
    }

    #[test]
    fn test_invalid_options_fail_every_image() {
        let images: Vec<Image<Rgba<u8>>> = vec![Image::new(2, 2), Image::new(3, 3)];
        let batch = MaskBatch::new(MaskOptions::new().fuzz(f64::INFINITY));
        let report = batch.run(&MaskContext::new("bad fuzz"), &images);
        assert_eq!(report.failed(), 2);
    }

    #[test]
    fn test_empty_batch() {
        let report = MaskBatch::default().run(&MaskContext::default(), &[]);
        assert!(report.is_empty());
        assert_eq!(report.failed(), 0);
    }

    #[test]
    fn test_context_label() {
        let context = MaskContext::with_span("assets", Span::none());
        assert_eq!(context.label(), "assets");
    }
}
