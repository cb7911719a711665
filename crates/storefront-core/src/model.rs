// ── Domain model ──
//
// The wire representation in `storefront-api` already matches the domain
// one-to-one (the serde codecs absorb the 0/1 flags and stringly prices),
// so the product type is shared rather than duplicated here.

pub use storefront_api::Product;

/// Upper bound on the secondary image list. The list never grows past
/// this, whether through the auto-grow rule or the explicit add action.
pub const MAX_SECONDARY_IMAGES: usize = 5;
