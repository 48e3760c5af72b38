use chrono::{DateTime, Utc};

/// A storefront event: a fact about something that already happened.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Dotted name, module first (e.g. "cart.item_added").
    fn event_type(&self) -> &'static str;

    /// Payload schema version.
    fn version(&self) -> u32;

    fn occurred_at(&self) -> DateTime<Utc>;

    /// Module prefix of [`Event::event_type`] ("cart", "checkout").
    fn category(&self) -> &'static str {
        let ty = self.event_type();
        ty.split_once('.').map_or(ty, |(head, _)| head)
    }
}
