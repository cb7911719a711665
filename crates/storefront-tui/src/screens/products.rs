//! Products screen — the catalog table plus the create/edit/delete modal.
//!
//! The table is read-only; every mutation goes through the modal form in
//! `storefront_core` and comes back as a refetched snapshot. While the
//! modal is open it captures all keyboard input.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState,
};
use tokio::sync::mpsc::UnboundedSender;

use storefront_core::{
    DraftField, MAX_SECONDARY_IMAGES, ModalForm, ModalMode, ModalSurface, Product, ProductDraft,
};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::money;

/// Surface wired into the modal controller; render reads the flag.
struct OverlayFlag(Arc<AtomicBool>);

impl ModalSurface for OverlayFlag {
    fn show(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }

    fn hide(&mut self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// Which modal input has focus. Scalar fields come first, then one slot
/// per secondary image, then the enabled toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModalFocus {
    Scalar(DraftField),
    Image(usize),
    Enabled,
}

const SCALAR_ORDER: [DraftField; 8] = [
    DraftField::Title,
    DraftField::Category,
    DraftField::OriginPrice,
    DraftField::Price,
    DraftField::Unit,
    DraftField::Description,
    DraftField::Content,
    DraftField::ImageUrl,
];

fn scalar_value(draft: &ProductDraft, field: DraftField) -> &str {
    match field {
        DraftField::Title => &draft.title,
        DraftField::Category => &draft.category,
        DraftField::OriginPrice => &draft.origin_price,
        DraftField::Price => &draft.price,
        DraftField::Unit => &draft.unit,
        DraftField::Description => &draft.description,
        DraftField::Content => &draft.content,
        DraftField::ImageUrl => &draft.image_url,
    }
}

pub struct ProductsScreen {
    focused: bool,
    action_tx: Option<UnboundedSender<Action>>,
    products: Arc<Vec<Arc<Product>>>,
    table_state: TableState,
    form: ModalForm,
    overlay_visible: Arc<AtomicBool>,
    modal_focus: ModalFocus,
    /// A confirm is in flight; modal input is ignored until it lands.
    busy: bool,
    throbber_state: throbber_widgets_tui::ThrobberState,
}

impl ProductsScreen {
    pub fn new() -> Self {
        let overlay_visible = Arc::new(AtomicBool::new(false));
        Self {
            focused: false,
            action_tx: None,
            products: Arc::new(Vec::new()),
            table_state: TableState::default(),
            form: ModalForm::new(Box::new(OverlayFlag(Arc::clone(&overlay_visible)))),
            overlay_visible,
            modal_focus: ModalFocus::Scalar(DraftField::Title),
            busy: false,
            throbber_state: throbber_widgets_tui::ThrobberState::default(),
        }
    }

    // ── Table selection ──────────────────────────────────────────────

    fn selected_index(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    fn select(&mut self, idx: usize) {
        let len = self.products.len();
        let clamped = if len == 0 { 0 } else { idx.min(len - 1) };
        self.table_state.select(Some(clamped));
    }

    #[allow(clippy::cast_sign_loss, clippy::as_conversions)]
    fn move_selection(&mut self, delta: isize) {
        let len = self.products.len();
        if len == 0 {
            return;
        }
        #[allow(clippy::cast_possible_wrap)]
        let current = self.selected_index() as isize;
        #[allow(clippy::cast_possible_wrap)]
        let next = (current + delta).clamp(0, len as isize - 1);
        self.select(next as usize);
    }

    fn selected_product(&self) -> Option<Arc<Product>> {
        self.products.get(self.selected_index()).cloned()
    }

    // ── Modal focus ──────────────────────────────────────────────────

    /// All focusable modal inputs in tab order, sized to the current
    /// image list.
    fn focus_order(&self) -> Vec<ModalFocus> {
        let mut order: Vec<ModalFocus> =
            SCALAR_ORDER.iter().copied().map(ModalFocus::Scalar).collect();
        for i in 0..self.form.draft().images_url.len() {
            order.push(ModalFocus::Image(i));
        }
        order.push(ModalFocus::Enabled);
        order
    }

    fn focus_step(&mut self, backwards: bool) {
        let order = self.focus_order();
        let pos = order
            .iter()
            .position(|&f| f == self.modal_focus)
            .unwrap_or(0);
        let next = if backwards {
            (pos + order.len() - 1) % order.len()
        } else {
            (pos + 1) % order.len()
        };
        self.modal_focus = order[next];
    }

    /// The image list can shrink out from under the focus; clamp it back
    /// onto a live slot.
    fn clamp_modal_focus(&mut self) {
        if let ModalFocus::Image(i) = self.modal_focus {
            let len = self.form.draft().images_url.len();
            if i >= len {
                self.modal_focus = if len == 0 {
                    ModalFocus::Scalar(DraftField::ImageUrl)
                } else {
                    ModalFocus::Image(len - 1)
                };
            }
        }
    }

    fn open_modal(&mut self, product: Option<&Product>, mode: ModalMode) {
        self.form.open(product, mode);
        self.modal_focus = ModalFocus::Scalar(DraftField::Title);
        self.busy = false;
    }

    // ── Modal editing ────────────────────────────────────────────────

    fn push_char(&mut self, c: char) {
        match self.modal_focus {
            ModalFocus::Scalar(field) => {
                let mut value = scalar_value(self.form.draft(), field).to_string();
                value.push(c);
                self.form.set_field(field, value);
            }
            ModalFocus::Image(i) => {
                let mut value = self
                    .form
                    .draft()
                    .images_url
                    .get(i)
                    .cloned()
                    .unwrap_or_default();
                value.push(c);
                self.form.change_image(i, value);
                self.clamp_modal_focus();
            }
            ModalFocus::Enabled => {}
        }
    }

    fn pop_char(&mut self) {
        match self.modal_focus {
            ModalFocus::Scalar(field) => {
                let mut value = scalar_value(self.form.draft(), field).to_string();
                value.pop();
                self.form.set_field(field, value);
            }
            ModalFocus::Image(i) => {
                let mut value = self
                    .form
                    .draft()
                    .images_url
                    .get(i)
                    .cloned()
                    .unwrap_or_default();
                value.pop();
                self.form.change_image(i, value);
                self.clamp_modal_focus();
            }
            ModalFocus::Enabled => {}
        }
    }

    fn submit_modal(&mut self) -> Option<Action> {
        let pending = self.form.confirm()?;
        self.busy = true;
        Some(Action::SubmitModal(pending))
    }

    fn handle_modal_key(&mut self, key: KeyEvent) -> Option<Action> {
        if self.busy {
            return None;
        }

        // Delete is a yes/no prompt, not a form.
        if self.form.mode() == Some(ModalMode::Delete) {
            return match key.code {
                KeyCode::Char('y' | 'Y') | KeyCode::Enter => self.submit_modal(),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => {
                    self.form.close();
                    None
                }
                _ => None,
            };
        }

        match key.code {
            KeyCode::Esc => {
                self.form.close();
                None
            }
            KeyCode::Tab | KeyCode::Down => {
                self.focus_step(false);
                None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus_step(true);
                None
            }
            KeyCode::Enter => self.submit_modal(),
            KeyCode::Char(' ') if self.modal_focus == ModalFocus::Enabled => {
                self.form.toggle_enabled();
                None
            }
            KeyCode::Backspace => {
                self.pop_char();
                None
            }
            KeyCode::Char('a') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.form.add_image();
                None
            }
            KeyCode::Char('x') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.form.remove_image();
                self.clamp_modal_focus();
                None
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.push_char(c);
                None
            }
            _ => None,
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    #[allow(clippy::too_many_lines)]
    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let total = self.products.len();
        let block = Block::default()
            .title(format!(" Products ({total}) "))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([
            Constraint::Min(1),    // table
            Constraint::Length(1), // hints
        ])
        .split(inner);

        let header = Row::new(vec![
            Cell::from("").style(theme::table_header()),
            Cell::from("Title").style(theme::table_header()),
            Cell::from("Category").style(theme::table_header()),
            Cell::from("List").style(theme::table_header()),
            Cell::from("Price").style(theme::table_header()),
            Cell::from("Unit").style(theme::table_header()),
            Cell::from("Images").style(theme::table_header()),
            Cell::from("Status").style(theme::table_header()),
        ]);

        let selected_idx = self.selected_index();
        let rows: Vec<Row> = self
            .products
            .iter()
            .enumerate()
            .map(|(i, product)| {
                let is_selected = i == selected_idx;
                let prefix = if is_selected { "▸" } else { " " };

                let (status, status_color) = if product.is_enabled {
                    ("enabled", theme::MINT)
                } else {
                    ("disabled", theme::BORDER_GRAY)
                };

                // Primary counts as one; secondaries are capped at five.
                let image_count = usize::from(!product.image_url.is_empty())
                    + product.images_url.len();

                let row_style = if is_selected {
                    theme::table_selected()
                } else {
                    theme::table_row()
                };

                Row::new(vec![
                    Cell::from(prefix.to_string()),
                    Cell::from(product.title.clone())
                        .style(Style::default().fg(theme::DIM_WHITE).add_modifier(
                            if is_selected {
                                Modifier::BOLD
                            } else {
                                Modifier::empty()
                            },
                        )),
                    Cell::from(product.category.clone())
                        .style(Style::default().fg(theme::SKY)),
                    Cell::from(money::fmt_price(product.origin_price))
                        .style(Style::default().fg(theme::BORDER_GRAY)),
                    Cell::from(money::fmt_price(product.price))
                        .style(Style::default().fg(theme::GOLD)),
                    Cell::from(product.unit.clone()),
                    Cell::from(image_count.to_string()),
                    Cell::from(status).style(Style::default().fg(status_color)),
                ])
                .style(row_style)
            })
            .collect();

        let widths = [
            Constraint::Length(2),
            Constraint::Fill(3),
            Constraint::Fill(2),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(6),
            Constraint::Length(9),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(Style::default().bg(theme::BG_HIGHLIGHT));

        let mut state = self.table_state.clone();
        frame.render_stateful_widget(table, layout[0], &mut state);

        let hints = Line::from(vec![
            Span::styled("  j/k ", theme::key_hint_key()),
            Span::styled("navigate  ", theme::key_hint()),
            Span::styled("n ", theme::key_hint_key()),
            Span::styled("new  ", theme::key_hint()),
            Span::styled("e ", theme::key_hint_key()),
            Span::styled("edit  ", theme::key_hint()),
            Span::styled("d ", theme::key_hint_key()),
            Span::styled("delete  ", theme::key_hint()),
            Span::styled("r ", theme::key_hint_key()),
            Span::styled("refresh", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), layout[1]);
    }

    fn render_modal(&self, frame: &mut Frame, area: Rect) {
        let Some(mode) = self.form.mode() else {
            return;
        };

        if mode == ModalMode::Delete {
            self.render_delete_prompt(frame, area);
            return;
        }

        let panel_w = 64u16.min(area.width.saturating_sub(4));
        let panel_h = 30u16.min(area.height.saturating_sub(2));
        let x = (area.width.saturating_sub(panel_w)) / 2;
        let y = (area.height.saturating_sub(panel_h)) / 2;
        let panel = Rect::new(area.x + x, area.y + y, panel_w, panel_h);

        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            panel,
        );

        let block = Block::default()
            .title(format!(" {mode} "))
            .title_style(theme::title_style())
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());

        let inner = block.inner(panel);
        frame.render_widget(block, panel);

        let draft = self.form.draft();
        let mut lines: Vec<Line> = Vec::new();

        for field in SCALAR_ORDER {
            let active = self.modal_focus == ModalFocus::Scalar(field);
            lines.push(field_line(
                &field.to_string(),
                scalar_value(draft, field),
                active,
            ));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(
                "  Secondary images ({}/{MAX_SECONDARY_IMAGES})",
                draft.images_url.len()
            ),
            Style::default().fg(theme::SKY),
        )));
        for (i, url) in draft.images_url.iter().enumerate() {
            let active = self.modal_focus == ModalFocus::Image(i);
            lines.push(field_line(&format!("  #{}", i + 1), url, active));
        }

        lines.push(Line::from(""));
        let enabled_active = self.modal_focus == ModalFocus::Enabled;
        let marker = if draft.is_enabled { "[\u{2713}]" } else { "[ ]" };
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {marker} "),
                Style::default().fg(if enabled_active {
                    theme::AMBER
                } else if draft.is_enabled {
                    theme::MINT
                } else {
                    theme::BORDER_GRAY
                }),
            ),
            Span::styled(
                "Listed in the shop",
                Style::default().fg(if enabled_active {
                    theme::SKY
                } else {
                    theme::DIM_WHITE
                }),
            ),
        ]));

        let layout = Layout::vertical([
            Constraint::Min(1),    // fields
            Constraint::Length(1), // busy / hints
        ])
        .split(inner);

        frame.render_widget(Paragraph::new(lines), layout[0]);

        if self.busy {
            let throbber = throbber_widgets_tui::Throbber::default()
                .label(" Saving...")
                .style(Style::default().fg(theme::DIM_WHITE))
                .throbber_style(Style::default().fg(theme::AMBER));
            frame.render_stateful_widget(throbber, layout[1], &mut self.throbber_state.clone());
        } else {
            let hints = if self.modal_focus == ModalFocus::Enabled {
                "Space toggle  Tab next  Enter save  Esc cancel"
            } else if matches!(self.modal_focus, ModalFocus::Image(_)) {
                "Ctrl+A add  Ctrl+X remove  Tab next  Enter save  Esc cancel"
            } else {
                "Tab next  Shift+Tab prev  Enter save  Esc cancel"
            };
            frame.render_widget(
                Paragraph::new(Span::styled(hints, theme::key_hint()))
                    .alignment(Alignment::Center),
                layout[1],
            );
        }
    }

    fn render_delete_prompt(&self, frame: &mut Frame, area: Rect) {
        let width = 50u16.min(area.width.saturating_sub(4));
        let height = 5u16;
        let x = (area.width.saturating_sub(width)) / 2;
        let y = (area.height.saturating_sub(height)) / 2;
        let dialog = Rect::new(area.x + x, area.y + y, width, height);

        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            dialog,
        );

        let block = Block::default()
            .title(" Delete product ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme::ROSE));

        let inner = block.inner(dialog);
        frame.render_widget(block, dialog);

        let title = &self.form.draft().title;
        let text = vec![
            Line::from(Span::styled(
                format!("  Delete \"{title}\"?"),
                Style::default().fg(theme::DIM_WHITE),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("  y ", theme::key_hint_key()),
                Span::styled("delete    ", theme::key_hint()),
                Span::styled("n ", theme::key_hint_key()),
                Span::styled("cancel", theme::key_hint()),
            ]),
        ];
        frame.render_widget(Paragraph::new(text), inner);
    }
}

fn field_line<'a>(label: &str, value: &str, active: bool) -> Line<'a> {
    let label_style = if active {
        Style::default().fg(theme::SKY).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme::DIM_WHITE)
    };
    let value_style = if active {
        Style::default().fg(theme::AMBER)
    } else {
        Style::default().fg(theme::BORDER_GRAY)
    };
    let cursor = if active { "\u{2588}" } else { "" };
    Line::from(vec![
        Span::styled(format!("  {label:<18}"), label_style),
        Span::styled(format!("{value}{cursor}"), value_style),
    ])
}

impl Component for ProductsScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.form.is_open() {
            return Ok(self.handle_modal_key(key));
        }

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(1);
                Ok(None)
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(-1);
                Ok(None)
            }
            KeyCode::Char('g') => {
                self.select(0);
                Ok(None)
            }
            KeyCode::Char('G') => {
                let len = self.products.len();
                if len > 0 {
                    self.select(len - 1);
                }
                Ok(None)
            }
            KeyCode::Char('n') => {
                self.open_modal(None, ModalMode::Create);
                Ok(None)
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(product) = self.selected_product() {
                    self.open_modal(Some(&product), ModalMode::Edit);
                }
                Ok(None)
            }
            KeyCode::Char('d') => {
                if let Some(product) = self.selected_product() {
                    self.open_modal(Some(&product), ModalMode::Delete);
                }
                Ok(None)
            }
            KeyCode::Char('r') => Ok(Some(Action::RequestRefresh)),
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::ProductsUpdated(products) => {
                self.products = Arc::clone(products);
                let len = self.products.len();
                if len > 0 && self.selected_index() >= len {
                    self.select(len - 1);
                }
            }
            Action::ModalFinished { generation, result } => {
                self.busy = false;
                match result {
                    Ok(()) => {
                        // Stale completions lose to a reopened modal.
                        self.form.finish_confirm(*generation);
                    }
                    Err(_) => {
                        // The buffer stays as the operator left it; the
                        // app surfaces the error as a notification.
                    }
                }
            }
            Action::Tick => {
                if self.busy {
                    self.throbber_state.calc_next();
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        self.render_table(frame, area);

        if self.overlay_visible.load(Ordering::Relaxed) {
            self.render_modal(frame, area);
        }
    }

    fn captures_input(&self) -> bool {
        self.form.is_open()
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &'static str {
        "products"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent};
    use storefront_core::Command;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::from(code)
    }

    fn seeded_screen() -> ProductsScreen {
        let mut screen = ProductsScreen::new();
        let products: Vec<Arc<Product>> = vec![
            Arc::new(Product {
                id: Some("-Na".into()),
                title: "Oolong".into(),
                price: 120.0,
                ..Product::default()
            }),
            Arc::new(Product {
                id: Some("-Nb".into()),
                title: "Sencha".into(),
                price: 90.0,
                ..Product::default()
            }),
        ];
        screen
            .update(&Action::ProductsUpdated(Arc::new(products)))
            .unwrap();
        screen
    }

    #[test]
    fn new_key_opens_an_empty_create_modal() {
        let mut screen = seeded_screen();
        screen.handle_key_event(key(KeyCode::Char('n'))).unwrap();

        assert_eq!(screen.form.mode(), Some(ModalMode::Create));
        assert!(screen.form.draft().title.is_empty());
        assert!(screen.captures_input());
    }

    #[test]
    fn edit_key_seeds_the_modal_from_the_selected_row() {
        let mut screen = seeded_screen();
        screen.handle_key_event(key(KeyCode::Char('j'))).unwrap();
        screen.handle_key_event(key(KeyCode::Char('e'))).unwrap();

        assert_eq!(screen.form.mode(), Some(ModalMode::Edit));
        assert_eq!(screen.form.draft().title, "Sencha");
    }

    #[test]
    fn typing_in_the_modal_lands_in_the_focused_field() {
        let mut screen = seeded_screen();
        screen.handle_key_event(key(KeyCode::Char('n'))).unwrap();

        for c in "Tea".chars() {
            screen.handle_key_event(key(KeyCode::Char(c))).unwrap();
        }
        assert_eq!(screen.form.draft().title, "Tea");
    }

    #[test]
    fn typing_into_the_last_image_slot_grows_the_list() {
        let mut screen = seeded_screen();
        screen.handle_key_event(key(KeyCode::Char('n'))).unwrap();
        screen.form.add_image();
        screen.modal_focus = ModalFocus::Image(0);

        screen.handle_key_event(key(KeyCode::Char('h'))).unwrap();

        // One typed character in the trailing slot spawns the next one.
        assert_eq!(screen.form.draft().images_url.len(), 2);
        assert_eq!(screen.form.draft().images_url[0], "h");
    }

    #[test]
    fn emptying_a_slot_moves_focus_back_onto_a_live_one() {
        let mut screen = seeded_screen();
        screen.handle_key_event(key(KeyCode::Char('n'))).unwrap();
        screen.form.add_image();
        screen.form.change_image(0, "x".into());
        assert_eq!(screen.form.draft().images_url.len(), 2);

        screen.modal_focus = ModalFocus::Image(1);
        screen.modal_focus = ModalFocus::Image(0);
        screen.handle_key_event(key(KeyCode::Backspace)).unwrap();

        assert_eq!(screen.form.draft().images_url.len(), 1);
        assert_eq!(screen.modal_focus, ModalFocus::Image(0));
    }

    #[test]
    fn delete_prompt_confirms_into_a_delete_command() {
        let mut screen = seeded_screen();
        screen.handle_key_event(key(KeyCode::Char('d'))).unwrap();
        assert_eq!(screen.form.mode(), Some(ModalMode::Delete));

        let action = screen.handle_key_event(key(KeyCode::Char('y'))).unwrap();
        match action {
            Some(Action::SubmitModal(pending)) => match pending.command {
                Command::DeleteProduct { id } => assert_eq!(id, "-Na"),
                other => panic!("expected DeleteProduct, got {other:?}"),
            },
            other => panic!("expected SubmitModal, got {other:?}"),
        }
        assert!(screen.busy);
    }

    #[test]
    fn successful_finish_closes_the_modal() {
        let mut screen = seeded_screen();
        screen.handle_key_event(key(KeyCode::Char('n'))).unwrap();
        let action = screen.handle_key_event(key(KeyCode::Enter)).unwrap();
        let Some(Action::SubmitModal(pending)) = action else {
            panic!("expected SubmitModal");
        };

        screen
            .update(&Action::ModalFinished {
                generation: pending.generation,
                result: Ok(()),
            })
            .unwrap();

        assert!(!screen.form.is_open());
        assert!(!screen.captures_input());
    }

    #[test]
    fn failed_finish_leaves_the_modal_open() {
        let mut screen = seeded_screen();
        screen.handle_key_event(key(KeyCode::Char('n'))).unwrap();
        let Some(Action::SubmitModal(pending)) =
            screen.handle_key_event(key(KeyCode::Enter)).unwrap()
        else {
            panic!("expected SubmitModal");
        };

        screen
            .update(&Action::ModalFinished {
                generation: pending.generation,
                result: Err("rejected".into()),
            })
            .unwrap();

        assert!(screen.form.is_open());
        assert!(!screen.busy);
    }

    #[test]
    fn stale_finish_does_not_close_a_reopened_modal() {
        let mut screen = seeded_screen();
        screen.handle_key_event(key(KeyCode::Char('n'))).unwrap();
        let Some(Action::SubmitModal(pending)) =
            screen.handle_key_event(key(KeyCode::Enter)).unwrap()
        else {
            panic!("expected SubmitModal");
        };

        // Operator reopens before the slow confirm lands.
        screen.handle_key_event(key(KeyCode::Esc)).unwrap();
        screen.handle_key_event(key(KeyCode::Char('e'))).unwrap();

        screen
            .update(&Action::ModalFinished {
                generation: pending.generation,
                result: Ok(()),
            })
            .unwrap();

        assert!(screen.form.is_open());
        assert_eq!(screen.form.mode(), Some(ModalMode::Edit));
    }

    #[test]
    fn escape_discards_the_draft() {
        let mut screen = seeded_screen();
        screen.handle_key_event(key(KeyCode::Char('n'))).unwrap();
        screen.handle_key_event(key(KeyCode::Char('x'))).unwrap();

        screen.handle_key_event(key(KeyCode::Esc)).unwrap();
        assert!(!screen.form.is_open());

        screen.handle_key_event(key(KeyCode::Char('n'))).unwrap();
        assert!(screen.form.draft().title.is_empty());
    }
}
