//! Widget library seam

use async_trait::async_trait;
use tabledom::Element;

use crate::model::RenderOptions;

/// The live widget library the hydrator hands the table to.
///
/// `attach` receives the prepared table (all rows visible, marker class
/// removed, node identities preserved from the static markup) and builds the
/// live wrapper tree around it. The returned future resolves when the widget
/// signals that initialization finished; the hydrator swaps the returned
/// subtree into the page in one step.
#[async_trait]
pub trait WidgetLibrary: Send + Sync {
    async fn attach(&self, table: Element, options: &RenderOptions) -> Element;
}
