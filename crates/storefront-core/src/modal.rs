// ── Modal form controller ──
//
// One disposable draft buffer unifies the create, edit, and delete flows:
// `open` seeds it (template or existing product), field edits mutate it,
// `confirm` turns it into exactly one command, `close` discards it. The
// canonical list is never touched directly -- a successful confirm goes
// through the API and a refetch.
//
// The secondary image list keeps a single trailing empty slot as the
// "add another" affordance: editing the last slot to a non-empty value
// grows the list by one empty slot (up to the cap), emptying the last
// slot shrinks it back.

use strum::Display;

use crate::command::Command;
use crate::model::{MAX_SECONDARY_IMAGES, Product};

/// Presentation side of the modal. The controller signals visibility
/// transitions through this and knows nothing about rendering.
pub trait ModalSurface: Send {
    fn show(&mut self);
    fn hide(&mut self);
}

/// Surface that does nothing; for headless use and plumbing tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl ModalSurface for NullSurface {
    fn show(&mut self) {}
    fn hide(&mut self) {}
}

/// What the open modal is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ModalMode {
    #[strum(serialize = "New product")]
    Create,
    #[strum(serialize = "Edit product")]
    Edit,
    #[strum(serialize = "Delete product")]
    Delete,
}

/// Scalar draft fields addressable by [`ModalForm::set_field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DraftField {
    #[strum(serialize = "Title")]
    Title,
    #[strum(serialize = "Category")]
    Category,
    #[strum(serialize = "Original price")]
    OriginPrice,
    #[strum(serialize = "Price")]
    Price,
    #[strum(serialize = "Unit")]
    Unit,
    #[strum(serialize = "Description")]
    Description,
    #[strum(serialize = "Content")]
    Content,
    #[strum(serialize = "Primary image URL")]
    ImageUrl,
}

/// The transient working copy of a product being created, edited, or
/// deleted. Price fields hold raw operator input as strings; coercion
/// happens once, in [`ProductDraft::to_payload`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductDraft {
    /// Server id; empty for unsaved records.
    pub id: String,
    pub title: String,
    pub category: String,
    pub origin_price: String,
    pub price: String,
    pub unit: String,
    pub description: String,
    pub content: String,
    pub is_enabled: bool,
    pub image_url: String,
    pub images_url: Vec<String>,
}

impl ProductDraft {
    /// The all-empty template seeding CREATE mode.
    pub fn template() -> Self {
        Self::default()
    }

    /// Seed the draft from an existing product (EDIT / DELETE).
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.id.clone().unwrap_or_default(),
            title: product.title.clone(),
            category: product.category.clone(),
            origin_price: format_price(product.origin_price),
            price: format_price(product.price),
            unit: product.unit.clone(),
            description: product.description.clone(),
            content: product.content.clone(),
            is_enabled: product.is_enabled,
            image_url: product.image_url.clone(),
            images_url: product.images_url.clone(),
        }
    }

    /// Normalize the draft into an outgoing payload: prices coerced to
    /// numbers (unparseable input collapses to zero), empty image slots
    /// stripped, and the id only present when the record is saved.
    pub fn to_payload(&self) -> Product {
        Product {
            id: (!self.id.is_empty()).then(|| self.id.clone()),
            title: self.title.clone(),
            category: self.category.clone(),
            origin_price: parse_price(&self.origin_price),
            price: parse_price(&self.price),
            unit: self.unit.clone(),
            description: self.description.clone(),
            content: self.content.clone(),
            is_enabled: self.is_enabled,
            image_url: self.image_url.clone(),
            images_url: self
                .images_url
                .iter()
                .filter(|url| !url.is_empty())
                .cloned()
                .collect(),
        }
    }
}

fn parse_price(input: &str) -> f64 {
    input.trim().parse().unwrap_or(0.0)
}

fn format_price(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

/// A confirm in flight: the command to run plus the buffer generation it
/// was taken from. Completions carrying a stale generation are ignored,
/// so a reopen during a slow confirm always wins.
#[derive(Debug, Clone)]
pub struct PendingConfirm {
    pub generation: u64,
    pub command: Command,
}

/// State machine behind the product modal.
///
/// States: closed, or open in one of [`ModalMode`]'s three modes.
/// Reopening from any state overwrites the draft; confirm and close both
/// return to closed.
pub struct ModalForm {
    mode: Option<ModalMode>,
    draft: ProductDraft,
    /// Bumped on every `open`; stamps outgoing confirms.
    generation: u64,
    surface: Box<dyn ModalSurface>,
}

impl ModalForm {
    pub fn new(surface: Box<dyn ModalSurface>) -> Self {
        Self {
            mode: None,
            draft: ProductDraft::template(),
            generation: 0,
            surface,
        }
    }

    pub fn mode(&self) -> Option<ModalMode> {
        self.mode
    }

    pub fn is_open(&self) -> bool {
        self.mode.is_some()
    }

    pub fn draft(&self) -> &ProductDraft {
        &self.draft
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Open the modal. `None` seeds the template (CREATE); a product
    /// seeds a copy of it (EDIT / DELETE). Valid from any state --
    /// reopening overwrites whatever was there.
    pub fn open(&mut self, product: Option<&Product>, mode: ModalMode) {
        self.draft = product.map_or_else(ProductDraft::template, ProductDraft::from_product);
        self.mode = Some(mode);
        self.generation += 1;
        self.surface.show();
    }

    /// Close the modal, discarding unsaved edits unconditionally.
    pub fn close(&mut self) {
        self.mode = None;
        self.draft = ProductDraft::template();
        self.surface.hide();
    }

    // ── Draft edits ──────────────────────────────────────────────────

    /// Replace one scalar field. Tolerated (and meaningless) in DELETE
    /// mode; ignored while closed.
    pub fn set_field(&mut self, field: DraftField, value: String) {
        if self.mode.is_none() {
            return;
        }
        match field {
            DraftField::Title => self.draft.title = value,
            DraftField::Category => self.draft.category = value,
            DraftField::OriginPrice => self.draft.origin_price = value,
            DraftField::Price => self.draft.price = value,
            DraftField::Unit => self.draft.unit = value,
            DraftField::Description => self.draft.description = value,
            DraftField::Content => self.draft.content = value,
            DraftField::ImageUrl => self.draft.image_url = value,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.mode.is_some() {
            self.draft.is_enabled = enabled;
        }
    }

    pub fn toggle_enabled(&mut self) {
        if self.mode.is_some() {
            self.draft.is_enabled = !self.draft.is_enabled;
        }
    }

    /// Replace `images_url[index]`, then re-shape the list:
    ///
    /// 1. editing the last slot to a non-empty value appends one empty
    ///    slot while under the cap (the "add another" affordance);
    /// 2. otherwise, emptying a slot pops the last slot when it is empty
    ///    and more than one slot remains.
    ///
    /// Both rules look at the list *after* the in-place replacement, and
    /// at most one applies. Writing one slot past the end appends (the
    /// empty template has no slots, yet slot 0 must accept input);
    /// indexes beyond that are ignored.
    pub fn change_image(&mut self, index: usize, value: String) {
        let images = &mut self.draft.images_url;
        if index == images.len() && index < MAX_SECONDARY_IMAGES {
            images.push(String::new());
        }
        let Some(slot) = images.get_mut(index) else {
            return;
        };
        let emptied = value.is_empty();
        *slot = value;

        let len = images.len();
        let last_is_empty = images.last().is_some_and(String::is_empty);

        if index + 1 == len && !last_is_empty && len < MAX_SECONDARY_IMAGES {
            images.push(String::new());
        } else if emptied && len > 1 && last_is_empty {
            images.pop();
        }
    }

    /// Append one empty slot, up to the cap.
    pub fn add_image(&mut self) {
        if self.draft.images_url.len() < MAX_SECONDARY_IMAGES {
            self.draft.images_url.push(String::new());
        }
    }

    /// Remove the last slot; no-op on an empty list.
    pub fn remove_image(&mut self) {
        self.draft.images_url.pop();
    }

    // ── Confirm ──────────────────────────────────────────────────────

    /// Turn the open modal into the single command its mode calls for.
    /// Returns `None` while closed. The buffer itself is untouched; on a
    /// successful completion call [`finish_confirm`](Self::finish_confirm).
    pub fn confirm(&self) -> Option<PendingConfirm> {
        let mode = self.mode?;
        let command = match mode {
            ModalMode::Create => Command::CreateProduct(self.draft.to_payload()),
            ModalMode::Edit => Command::UpdateProduct {
                id: self.draft.id.clone(),
                product: self.draft.to_payload(),
            },
            ModalMode::Delete => Command::DeleteProduct {
                id: self.draft.id.clone(),
            },
        };
        Some(PendingConfirm {
            generation: self.generation,
            command,
        })
    }

    /// Complete a confirm that succeeded. Closes the modal only if the
    /// buffer the confirm started from is still the active one; a stale
    /// completion (the operator reopened in the meantime) is dropped and
    /// `false` comes back. On failure don't call this at all -- the modal
    /// stays open with the buffer unchanged.
    pub fn finish_confirm(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.mode.is_none() {
            return false;
        }
        self.close();
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts show/hide calls so transitions can be asserted.
    #[derive(Default, Clone)]
    struct RecordingSurface {
        shows: Arc<AtomicUsize>,
        hides: Arc<AtomicUsize>,
    }

    impl ModalSurface for RecordingSurface {
        fn show(&mut self) {
            self.shows.fetch_add(1, Ordering::SeqCst);
        }
        fn hide(&mut self) {
            self.hides.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn form() -> ModalForm {
        ModalForm::new(Box::new(NullSurface))
    }

    fn form_with_images(images: &[&str]) -> ModalForm {
        let mut f = form();
        f.open(None, ModalMode::Create);
        f.draft.images_url = images.iter().map(|s| (*s).to_owned()).collect();
        f
    }

    fn sample_product() -> Product {
        Product {
            id: Some("-Nprod001".into()),
            title: "Espresso Blend".into(),
            category: "coffee".into(),
            origin_price: 450.0,
            price: 399.0,
            unit: "bag".into(),
            is_enabled: true,
            images_url: vec!["https://cdn.example/a.png".into()],
            ..Product::default()
        }
    }

    // ── Image list shape ─────────────────────────────────────────────

    #[test]
    fn editing_last_slot_non_empty_grows_list() {
        for n in 1..=4 {
            let urls: Vec<String> = (0..n).map(|i| format!("https://cdn.example/{i}.png")).collect();
            let mut f = form_with_images(&urls.iter().map(String::as_str).collect::<Vec<_>>());

            f.change_image(n - 1, "https://cdn.example/new.png".into());

            let images = &f.draft().images_url;
            assert_eq!(images.len(), n + 1, "length {n} should grow to {}", n + 1);
            assert_eq!(images.last().unwrap(), "");
        }
    }

    #[test]
    fn list_never_grows_past_the_cap() {
        let mut f = form_with_images(&["a", "b", "c", "d", "e"]);
        f.change_image(4, "https://cdn.example/last.png".into());
        assert_eq!(f.draft().images_url.len(), MAX_SECONDARY_IMAGES);
    }

    #[test]
    fn emptying_last_slot_collapses_repeatedly() {
        let mut f = form_with_images(&["a", "b", ""]);

        // Re-setting the empty last slot to empty pops it.
        f.change_image(2, String::new());
        assert_eq!(f.draft().images_url, vec!["a", "b"]);

        f.change_image(1, String::new());
        assert_eq!(f.draft().images_url, vec!["a"]);

        // Length 1 is the floor.
        f.change_image(0, String::new());
        assert_eq!(f.draft().images_url, vec![""]);
    }

    #[test]
    fn emptying_inner_slot_keeps_length_when_last_is_full() {
        let mut f = form_with_images(&["a", "b", "c"]);
        f.change_image(1, String::new());
        assert_eq!(f.draft().images_url, vec!["a", "", "c"]);
    }

    #[test]
    fn change_image_out_of_range_is_ignored() {
        let mut f = form_with_images(&["a"]);
        f.change_image(7, "x".into());
        assert_eq!(f.draft().images_url, vec!["a"]);
    }

    #[test]
    fn first_url_typed_into_the_empty_template_is_kept() {
        let mut f = form();
        f.open(None, ModalMode::Create);
        assert!(f.draft().images_url.is_empty());

        // Slot 0 does not exist yet; writing it appends, then the grow
        // rule adds the next placeholder.
        f.change_image(0, "http://x/a.png".into());
        assert_eq!(f.draft().images_url, vec!["http://x/a.png", ""]);

        let payload = f.draft().to_payload();
        assert_eq!(payload.images_url, vec!["http://x/a.png"]);
    }

    #[test]
    fn writing_one_past_the_end_appends_up_to_the_cap() {
        let mut f = form_with_images(&["a", "b"]);
        f.change_image(2, "c".into());
        assert_eq!(f.draft().images_url, vec!["a", "b", "c", ""]);

        let mut full = form_with_images(&["a", "b", "c", "d", "e"]);
        full.change_image(5, "f".into());
        assert_eq!(full.draft().images_url.len(), MAX_SECONDARY_IMAGES);
    }

    #[test]
    fn add_image_appends_exactly_one_until_cap() {
        let mut f = form();
        f.open(None, ModalMode::Create);

        for expected in 1..=MAX_SECONDARY_IMAGES {
            f.add_image();
            assert_eq!(f.draft().images_url.len(), expected);
        }
        f.add_image();
        assert_eq!(f.draft().images_url.len(), MAX_SECONDARY_IMAGES);
    }

    #[test]
    fn remove_image_on_empty_list_is_a_noop() {
        let mut f = form();
        f.open(None, ModalMode::Create);
        assert!(f.draft().images_url.is_empty());
        f.remove_image();
        assert!(f.draft().images_url.is_empty());
    }

    // ── Open / close / fields ────────────────────────────────────────

    #[test]
    fn open_seeds_template_for_create() {
        let mut f = form();
        f.open(None, ModalMode::Create);
        assert_eq!(f.mode(), Some(ModalMode::Create));
        assert_eq!(*f.draft(), ProductDraft::template());
    }

    #[test]
    fn open_copies_product_for_edit() {
        let mut f = form();
        let product = sample_product();
        f.open(Some(&product), ModalMode::Edit);

        assert_eq!(f.draft().id, "-Nprod001");
        assert_eq!(f.draft().title, "Espresso Blend");
        assert_eq!(f.draft().price, "399");
        assert!(f.draft().is_enabled);
    }

    #[test]
    fn reopening_overwrites_unsaved_edits() {
        let mut f = form();
        f.open(None, ModalMode::Create);
        f.set_field(DraftField::Title, "half-typed".into());

        f.open(Some(&sample_product()), ModalMode::Edit);
        assert_eq!(f.draft().title, "Espresso Blend");
    }

    #[test]
    fn close_discards_the_draft() {
        let mut f = form();
        f.open(Some(&sample_product()), ModalMode::Edit);
        f.set_field(DraftField::Title, "changed".into());

        f.close();
        assert!(!f.is_open());
        assert_eq!(*f.draft(), ProductDraft::template());
    }

    #[test]
    fn set_field_is_ignored_while_closed() {
        let mut f = form();
        f.set_field(DraftField::Title, "ghost".into());
        assert_eq!(f.draft().title, "");
    }

    #[test]
    fn set_field_tolerated_in_delete_mode() {
        let mut f = form();
        f.open(Some(&sample_product()), ModalMode::Delete);
        f.set_field(DraftField::Title, "renamed".into());
        assert_eq!(f.draft().title, "renamed");
    }

    #[test]
    fn surface_sees_every_transition() {
        let surface = RecordingSurface::default();
        let mut f = ModalForm::new(Box::new(surface.clone()));

        f.open(None, ModalMode::Create);
        f.open(Some(&sample_product()), ModalMode::Edit);
        f.close();

        assert_eq!(surface.shows.load(Ordering::SeqCst), 2);
        assert_eq!(surface.hides.load(Ordering::SeqCst), 1);
    }

    // ── Confirm ──────────────────────────────────────────────────────

    #[test]
    fn create_confirm_payload_never_carries_an_id() {
        let mut f = form();
        f.open(None, ModalMode::Create);
        f.set_field(DraftField::Title, "Widget".into());

        let pending = f.confirm().unwrap();
        match pending.command {
            Command::CreateProduct(payload) => {
                assert!(payload.id.is_none());
                assert_eq!(payload.title, "Widget");
            }
            other => panic!("expected CreateProduct, got {other:?}"),
        }
    }

    #[test]
    fn delete_confirm_targets_the_seeded_id() {
        let mut f = form();
        f.open(Some(&sample_product()), ModalMode::Delete);

        let pending = f.confirm().unwrap();
        match pending.command {
            Command::DeleteProduct { id } => assert_eq!(id, "-Nprod001"),
            other => panic!("expected DeleteProduct, got {other:?}"),
        }
    }

    #[test]
    fn edit_confirm_carries_normalized_payload() {
        let mut f = form();
        f.open(Some(&sample_product()), ModalMode::Edit);
        f.set_field(DraftField::Price, "  420 ".into());
        f.change_image(0, "https://cdn.example/b.png".into());

        let pending = f.confirm().unwrap();
        match pending.command {
            Command::UpdateProduct { id, product } => {
                assert_eq!(id, "-Nprod001");
                assert!((product.price - 420.0).abs() < f64::EPSILON);
                // The trailing placeholder slot never reaches the wire.
                assert_eq!(product.images_url, vec!["https://cdn.example/b.png"]);
            }
            other => panic!("expected UpdateProduct, got {other:?}"),
        }
    }

    #[test]
    fn confirm_while_closed_yields_nothing() {
        let f = form();
        assert!(f.confirm().is_none());
    }

    #[test]
    fn finish_confirm_closes_matching_generation() {
        let mut f = form();
        f.open(None, ModalMode::Create);
        let pending = f.confirm().unwrap();

        assert!(f.finish_confirm(pending.generation));
        assert!(!f.is_open());
    }

    #[test]
    fn stale_confirm_loses_to_a_reopen() {
        let mut f = form();
        f.open(None, ModalMode::Create);
        let pending = f.confirm().unwrap();

        // Operator reopens before the network call completes.
        f.open(Some(&sample_product()), ModalMode::Edit);

        assert!(!f.finish_confirm(pending.generation));
        assert!(f.is_open());
        assert_eq!(f.draft().title, "Espresso Blend");
    }

    // ── Normalization ────────────────────────────────────────────────

    #[test]
    fn unparseable_prices_collapse_to_zero() {
        let draft = ProductDraft {
            origin_price: "abc".into(),
            price: String::new(),
            ..ProductDraft::template()
        };
        let payload = draft.to_payload();
        assert!((payload.origin_price - 0.0).abs() < f64::EPSILON);
        assert!((payload.price - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn payload_strips_every_empty_image_slot() {
        let draft = ProductDraft {
            images_url: vec![String::new(), "https://cdn.example/a.png".into(), String::new()],
            ..ProductDraft::template()
        };
        assert_eq!(draft.to_payload().images_url, vec!["https://cdn.example/a.png"]);
    }
}
