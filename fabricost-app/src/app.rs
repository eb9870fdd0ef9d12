//! Main application state and eframe integration.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use egui::{
    Align, Align2, CentralPanel, Color32, Context, Frame, Key, Layout, RichText, ScrollArea,
    TextEdit, TopBottomPanel, Vec2,
};
use fabricost_core::config::APP_NAME;
use fabricost_core::generator::{
    card_details, clipboard_text, format_quantity, generate_detailed_pdf, generate_simple_pdf,
    input_recap, piece_title, receipt_file_name, render_receipt, save_receipt, summary_line,
    DETAILED_PDF_FILE, SIMPLE_PDF_FILE,
};
use fabricost_core::{
    format_money, tr, tr_fmt, Breakdown, ErrorKind, Language, Mode, Piece, PieceForm, QuoteError,
    QuoteSession, RuleForm, Settings, SettingsStore, Text,
};

use crate::theme;

/// Which page is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Splash,
    ModeSelect,
    Input,
    Results,
}

/// Modal dialog currently on screen.
#[derive(Debug, Clone)]
enum Dialog {
    Message { title: String, body: String },
    ConfirmDelete { id: u32 },
}

/// User intents collected while drawing a frame, applied afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Action {
    ChooseMode(Mode),
    ShowAbout,
    SetLanguage(Language),
    SubmitPiece,
    EditPiece(u32),
    AskDelete(u32),
    ConfirmDelete(u32),
    RestoreDefaults,
    Calculate,
    BackToInput,
    BackToMenu,
    CopyPiece(u32),
    SaveReceipt(u32),
    SaveDetailedPdf,
    SaveSimplePdf,
    CloseDialog,
    Quit,
}

/// Main application state.
pub struct CalculatorApp {
    /// Persisted language and rules
    settings: Settings,
    /// Settings database; `None` when it could not be opened
    store: Option<SettingsStore>,

    screen: Screen,
    /// When the splash screen appeared
    started: Instant,

    /// Active quote (mode, rules, pieces)
    session: QuoteSession,
    /// Text of the pricing rules panel
    rule_form: RuleForm,
    /// Text of the add/edit piece form
    piece_form: PieceForm,
    /// Piece being edited, if any
    editing: Option<u32>,

    dialog: Option<Dialog>,
    status_message: String,
}

impl CalculatorApp {
    /// Create the application, loading settings from `settings_path` or the
    /// per-user default location.
    pub fn new(cc: &eframe::CreationContext<'_>, settings_path: Option<PathBuf>) -> Self {
        theme::apply(&cc.egui_ctx);

        let path = settings_path.unwrap_or_else(SettingsStore::default_path);
        let (store, settings) = match SettingsStore::open(&path).and_then(|store| {
            let settings = store.load()?;
            Ok((store, settings))
        }) {
            Ok((store, settings)) => (Some(store), settings),
            Err(e) => {
                tracing::warn!("Settings unavailable ({}), using factory defaults", e);
                (None, Settings::factory())
            }
        };

        let session = QuoteSession::new(Mode::ThreeD, settings.rules_for(Mode::ThreeD));
        let rule_form = RuleForm::from_rules(session.rules());

        Self {
            settings,
            store,
            screen: Screen::Splash,
            started: Instant::now(),
            session,
            rule_form,
            piece_form: PieceForm::default(),
            editing: None,
            dialog: None,
            status_message: String::new(),
        }
    }

    fn lang(&self) -> Language {
        self.settings.language
    }

    fn t(&self, text: Text) -> &'static str {
        tr(self.lang(), text)
    }

    fn mode(&self) -> Mode {
        self.session.mode()
    }

    // ==================== state changes ====================

    fn apply(&mut self, ctx: &Context, action: Action) {
        match action {
            Action::ChooseMode(mode) => self.start_mode(mode),
            Action::ShowAbout => self.message(Text::AboutTitle, self.t(Text::AboutBody).to_string()),
            Action::SetLanguage(lang) => {
                self.settings.language = lang;
                self.save_settings();
            }
            Action::SubmitPiece => self.submit_piece(),
            Action::EditPiece(id) => self.start_edit(id),
            Action::AskDelete(id) => self.dialog = Some(Dialog::ConfirmDelete { id }),
            Action::ConfirmDelete(id) => {
                self.dialog = None;
                self.delete_piece(id);
            }
            Action::RestoreDefaults => self.restore_defaults(),
            Action::Calculate => self.calculate(),
            Action::BackToInput => self.screen = Screen::Input,
            Action::BackToMenu => self.back_to_menu(),
            Action::CopyPiece(id) => self.copy_piece(ctx, id),
            Action::SaveReceipt(id) => self.export_receipt(id),
            Action::SaveDetailedPdf => self.export_pdf(true),
            Action::SaveSimplePdf => self.export_pdf(false),
            Action::CloseDialog => self.dialog = None,
            Action::Quit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
        }
    }

    /// Open a calculator with the saved rules for `mode`.
    fn start_mode(&mut self, mode: Mode) {
        self.session = QuoteSession::new(mode, self.settings.rules_for(mode));
        self.rule_form = RuleForm::from_rules(self.session.rules());
        self.piece_form.clear();
        self.editing = None;
        self.screen = Screen::Input;
        self.status_message.clear();
        tracing::info!("Started {} calculator", mode);
    }

    fn submit_piece(&mut self) {
        let inputs = match self.piece_form.parse(self.mode()) {
            Ok(inputs) => inputs,
            Err(e) => return self.report(e),
        };

        match self.editing.take() {
            Some(id) => {
                if let Err(e) = self.session.update_piece(id, inputs) {
                    return self.report(e);
                }
            }
            None => {
                self.session.add_piece(inputs);
            }
        }
        self.piece_form.clear();
    }

    fn start_edit(&mut self, id: u32) {
        if let Some(piece) = self.session.piece(id) {
            self.piece_form = PieceForm::from_inputs(&piece.inputs, self.mode());
            self.editing = Some(id);
        }
    }

    fn delete_piece(&mut self, id: u32) {
        if let Err(e) = self.session.remove_piece(id) {
            return self.report(e);
        }
        // Ids after the removed piece shift down by one.
        self.editing = match self.editing {
            Some(editing) if editing == id => {
                self.piece_form.clear();
                None
            }
            Some(editing) if editing > id => Some(editing - 1),
            other => other,
        };
    }

    fn restore_defaults(&mut self) {
        let mode = self.mode();
        let rules = self.settings.restore_defaults(mode);
        self.rule_form = RuleForm::from_rules(&rules);
        self.session.set_rules(rules);
        self.save_settings();
    }

    fn calculate(&mut self) {
        let mode = self.mode();
        let rules = match self.rule_form.parse(mode) {
            Ok(rules) => rules,
            Err(e) => return self.report(e),
        };
        self.session.set_rules(rules);

        match self.session.calculate_all() {
            Ok(summary) => {
                self.settings.set_rules_for(mode, rules);
                self.save_settings();
                self.status_message = summary_line(&summary, self.lang());
                self.screen = Screen::Results;
            }
            Err(e) => self.report(e),
        }
    }

    fn back_to_menu(&mut self) {
        self.persist_current_rules();
        self.save_settings();
        self.screen = Screen::ModeSelect;
        self.status_message.clear();
    }

    fn copy_piece(&mut self, ctx: &Context, id: u32) {
        let Some(piece) = self.session.piece(id) else {
            return;
        };
        match clipboard_text(piece, self.session.rules(), self.mode(), self.lang()) {
            Ok(text) => {
                ctx.output_mut(|o| o.copied_text = text);
                let body = tr_fmt(self.lang(), Text::CopiedMsg, &[("id", &id.to_string())]);
                self.message(Text::Copied, body);
            }
            Err(e) => self.report(e),
        }
    }

    fn export_receipt(&mut self, id: u32) {
        let Some(piece) = self.session.piece(id) else {
            return;
        };
        let img = match render_receipt(piece, self.session.rules(), self.mode(), self.lang()) {
            Ok(img) => img,
            Err(e) => return self.report(e),
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name(receipt_file_name(id))
            .save_file()
        else {
            return;
        };

        match save_receipt(&img, &path) {
            Ok(()) => {
                let body = tr_fmt(
                    self.lang(),
                    Text::ImgSaved,
                    &[("path", &path.display().to_string())],
                );
                self.message(Text::Success, body);
            }
            Err(e) => self.report(e),
        }
    }

    fn export_pdf(&mut self, detailed: bool) {
        let generated = if detailed {
            generate_detailed_pdf(&self.session, self.lang())
        } else {
            generate_simple_pdf(&self.session, self.lang())
        };
        let bytes = match generated {
            Ok(bytes) => bytes,
            Err(e) => return self.report(e),
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("PDF Document", &["pdf"])
            .set_file_name(if detailed { DETAILED_PDF_FILE } else { SIMPLE_PDF_FILE })
            .save_file()
        else {
            return;
        };

        match std::fs::write(&path, bytes) {
            Ok(()) => {
                tracing::info!("Saved PDF to {}", path.display());
                let body = tr_fmt(
                    self.lang(),
                    Text::PdfSaved,
                    &[("path", &path.display().to_string())],
                );
                self.message(Text::Success, body);
            }
            Err(e) => self.report(QuoteError::from(e)),
        }
    }

    /// Keep valid rule edits so they survive a restart.
    fn persist_current_rules(&mut self) {
        if matches!(self.screen, Screen::Input | Screen::Results) {
            if let Ok(rules) = self.rule_form.parse(self.mode()) {
                self.settings.set_rules_for(self.mode(), rules);
            }
        }
    }

    fn save_settings(&mut self) {
        let Some(store) = self.store.as_mut() else {
            return;
        };
        if let Err(e) = store.save(&self.settings) {
            tracing::error!("Failed to save settings: {}", e);
        }
    }

    fn message(&mut self, title: Text, body: String) {
        self.dialog = Some(Dialog::Message {
            title: self.t(title).to_string(),
            body,
        });
    }

    /// Show an error as the dialog matching its kind.
    fn report(&mut self, err: QuoteError) {
        let lang = self.lang();
        let (title, body) = match (&err, err.kind()) {
            (QuoteError::InvalidRule { field, .. }, _) => {
                let label = rule_label(field)
                    .map(|text| tr(lang, text).trim_end_matches([' ', ':']).to_string())
                    .unwrap_or_else(|| field.clone());
                (Text::Error, tr_fmt(lang, Text::InvalidRule, &[("field", &label)]))
            }
            (_, ErrorKind::InvalidInput) => (Text::Error, tr(lang, Text::InvalidNumbers).to_string()),
            (QuoteError::NoPieces, _) => (Text::Warning, tr(lang, Text::NeedPiece).to_string()),
            (QuoteError::NotCalculated, _) => (Text::Warning, tr(lang, Text::CalcFirst).to_string()),
            (_, ErrorKind::Precondition) => (Text::Warning, err.to_string()),
            (_, ErrorKind::Internal) => {
                tracing::error!("{}", err);
                (
                    Text::UnexpectedError,
                    tr_fmt(lang, Text::UnexpectedErrorMsg, &[("err", &err.to_string())]),
                )
            }
        };
        self.message(title, body);
    }

    // ==================== rendering ====================

    /// Render the menu bar.
    fn render_menu(&self, ctx: &Context, actions: &mut Vec<Action>) {
        TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button(self.t(Text::File), |ui| {
                    let in_calculator = matches!(self.screen, Screen::Input | Screen::Results);
                    if ui
                        .add_enabled(in_calculator, egui::Button::new(self.t(Text::Menu)))
                        .clicked()
                    {
                        actions.push(Action::BackToMenu);
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button(format!("{} (Ctrl+Q)", self.t(Text::Quit))).clicked() {
                        actions.push(Action::Quit);
                        ui.close_menu();
                    }
                });

                ui.menu_button(self.t(Text::Language), |ui| {
                    for lang in Language::ALL {
                        if ui
                            .radio(self.lang() == lang, lang.display_name())
                            .clicked()
                        {
                            actions.push(Action::SetLanguage(lang));
                            ui.close_menu();
                        }
                    }
                });

                ui.menu_button("?", |ui| {
                    if ui.button(self.t(Text::About)).clicked() {
                        actions.push(Action::ShowAbout);
                        ui.close_menu();
                    }
                });
            });
        });
    }

    /// Render the status bar.
    fn render_status_bar(&self, ctx: &Context) {
        TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(self.status_message.as_str());
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    ui.label(self.lang().code().to_uppercase());
                    if matches!(self.screen, Screen::Input | Screen::Results) {
                        ui.separator();
                        ui.label(mode_name(self.lang(), self.mode()));
                    }
                });
            });
        });
    }

    fn render_splash(&mut self, ctx: &Context) {
        CentralPanel::default()
            .frame(Frame::none().fill(theme::SPLASH_BG))
            .show(ctx, |ui| {
                ui.with_layout(Layout::top_down(Align::Center), |ui| {
                    ui.add_space(ui.available_height() * 0.4);
                    ui.label(
                        RichText::new(self.t(Text::AppTitle))
                            .size(32.0)
                            .strong()
                            .color(Color32::WHITE),
                    );
                    ui.label(
                        RichText::new(self.t(Text::BrandTagline))
                            .size(16.0)
                            .color(theme::ON_DARK_DIM),
                    );
                });
            });

        if self.started.elapsed().as_secs_f64() >= theme::SPLASH_SECONDS {
            self.screen = Screen::ModeSelect;
        } else {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }

    fn render_mode_select(&self, ctx: &Context, actions: &mut Vec<Action>) {
        CentralPanel::default().show(ctx, |ui| {
            ui.with_layout(Layout::top_down(Align::Center), |ui| {
                ui.add_space((ui.available_height() * 0.2).max(20.0));
                card_frame().show(ui, |ui| {
                    ui.set_width(360.0);
                    ui.vertical_centered(|ui| {
                        ui.add_space(20.0);
                        ui.label(
                            RichText::new(self.t(Text::AppTitle))
                                .size(24.0)
                                .strong()
                                .color(theme::HEADING_TEXT),
                        );
                        ui.label(RichText::new(self.t(Text::BrandTagline)).color(theme::DIM_TEXT));
                        ui.add_space(20.0);

                        let size = Vec2::new(300.0, 44.0);
                        if ui
                            .add_sized(size, filled_button(self.t(Text::ModeThreeD), theme::PRIMARY))
                            .clicked()
                        {
                            actions.push(Action::ChooseMode(Mode::ThreeD));
                        }
                        ui.add_space(10.0);
                        if ui
                            .add_sized(size, filled_button(self.t(Text::ModeLaser), theme::SUCCESS))
                            .clicked()
                        {
                            actions.push(Action::ChooseMode(Mode::Laser));
                        }
                        ui.add_space(20.0);
                        if ui
                            .add(
                                egui::Button::new(
                                    RichText::new(self.t(Text::AboutTitle)).color(theme::HEADING_TEXT),
                                )
                                .fill(theme::NEUTRAL_BUTTON),
                            )
                            .clicked()
                        {
                            actions.push(Action::ShowAbout);
                        }
                        ui.add_space(20.0);
                    });
                });
            });
        });
    }

    fn render_input(&mut self, ctx: &Context, actions: &mut Vec<Action>) {
        let title = format!(
            "{} · {}",
            self.t(Text::InputTitle),
            mode_name(self.lang(), self.mode())
        );
        render_header(ctx, "input_header", &title);

        CentralPanel::default().show(ctx, |ui| {
            ui.columns(2, |columns| {
                self.render_rules_panel(&mut columns[0], actions);
                columns[0].add_space(theme::CARD_PADDING);
                self.render_piece_form(&mut columns[0], actions);
                self.render_piece_list(&mut columns[1], actions);
            });
        });
    }

    fn render_rules_panel(&mut self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        let lang = self.lang();
        let uses_weight = self.mode().uses_weight();

        card_frame().show(ui, |ui| {
            ui.heading(tr(lang, Text::RulesTitle));
            ui.separator();
            egui::Grid::new("rules_grid")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    let form = &mut self.rule_form;
                    if uses_weight {
                        rule_row(ui, tr(lang, Text::RuleGramPrice), &mut form.gram_price);
                    }
                    rule_row(ui, tr(lang, Text::RuleNormalHour), &mut form.normal_hour_price);
                    if uses_weight {
                        rule_row(ui, tr(lang, Text::RuleExceedHour), &mut form.exceed_hour_price);
                        rule_row(ui, tr(lang, Text::RuleThreshold), &mut form.exceed_threshold);
                    }
                    rule_row(ui, tr(lang, Text::RuleMarkup), &mut form.markup_percent);
                });
            ui.add_space(8.0);
            if ui.button(tr(lang, Text::RestoreDefaults)).clicked() {
                actions.push(Action::RestoreDefaults);
            }
        });
    }

    fn render_piece_form(&mut self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        let lang = self.lang();
        let uses_weight = self.mode().uses_weight();
        let editing = self.editing;

        card_frame().show(ui, |ui| {
            ui.heading(tr(lang, Text::AddPieceSection));
            ui.separator();

            let mut submitted = false;
            egui::Grid::new("piece_grid")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    let form = &mut self.piece_form;
                    if uses_weight {
                        submitted |= form_row(ui, tr(lang, Text::Grams), &mut form.weight);
                    }
                    submitted |= form_row(ui, tr(lang, Text::Hours), &mut form.hours);
                    submitted |= form_row(ui, tr(lang, Text::Minutes), &mut form.minutes);
                });

            ui.add_space(8.0);
            let label = match editing {
                Some(id) => tr_fmt(lang, Text::UpdatePiece, &[("id", &id.to_string())]),
                None => tr(lang, Text::AddPiece).to_string(),
            };
            if ui.add(filled_button(label, theme::PRIMARY)).clicked() || submitted {
                actions.push(Action::SubmitPiece);
            }
        });
    }

    fn render_piece_list(&self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        let lang = self.lang();

        card_frame().show(ui, |ui| {
            ui.heading(self.t(Text::AddedPieces));
            ui.separator();

            ScrollArea::vertical()
                .max_height((ui.available_height() - 60.0).max(120.0))
                .auto_shrink([false, true])
                .show(ui, |ui| {
                    if self.session.is_empty() {
                        ui.label(RichText::new(self.t(Text::NoPieces)).color(theme::DIM_TEXT));
                    }
                    for piece in self.session.pieces() {
                        ui.horizontal(|ui| {
                            ui.label(
                                RichText::new(piece_summary(lang, piece, self.mode()))
                                    .color(theme::BODY_TEXT),
                            );
                            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                                if ui
                                    .add(filled_button(self.t(Text::Delete), theme::DELETE_BUTTON))
                                    .clicked()
                                {
                                    actions.push(Action::AskDelete(piece.id));
                                }
                                if ui
                                    .add(filled_button(self.t(Text::Edit), theme::EDIT_BUTTON))
                                    .clicked()
                                {
                                    actions.push(Action::EditPiece(piece.id));
                                }
                            });
                        });
                        ui.separator();
                    }
                });

            ui.add_space(8.0);
            let size = Vec2::new(ui.available_width(), 40.0);
            if ui
                .add_sized(size, filled_button(self.t(Text::CalculateAll), theme::SUCCESS))
                .clicked()
            {
                actions.push(Action::Calculate);
            }
        });
    }

    fn render_results(&self, ctx: &Context, actions: &mut Vec<Action>) {
        render_header(ctx, "results_header", self.t(Text::ResultsTitle));

        TopBottomPanel::top("results_toolbar")
            .frame(Frame::none().fill(theme::PAGE_BG).inner_margin(8.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    if ui.button(format!("← {}", self.t(Text::Back))).clicked() {
                        actions.push(Action::BackToInput);
                    }
                    if ui.button(self.t(Text::Menu)).clicked() {
                        actions.push(Action::BackToMenu);
                    }
                    ui.separator();
                    if ui
                        .add(filled_button(self.t(Text::PdfDetailed), theme::PRIMARY))
                        .clicked()
                    {
                        actions.push(Action::SaveDetailedPdf);
                    }
                    if ui
                        .add(filled_button(self.t(Text::PdfSimple), theme::PRIMARY))
                        .clicked()
                    {
                        actions.push(Action::SaveSimplePdf);
                    }
                });

                Frame::none()
                    .fill(theme::SUCCESS_BG)
                    .rounding(6.0)
                    .inner_margin(12.0)
                    .show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.label(
                            RichText::new(summary_line(&self.session.summary(), self.lang()))
                                .size(18.0)
                                .strong()
                                .color(theme::SUCCESS_TEXT),
                        );
                    });
            });

        CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical().show(ui, |ui| {
                let per_row = theme::cards_per_row(ui.available_width());
                let calculated: Vec<(&Piece, &Breakdown)> = self
                    .session
                    .pieces()
                    .iter()
                    .filter_map(|p| p.result().map(|b| (p, b)))
                    .collect();

                for row in calculated.chunks(per_row) {
                    ui.horizontal_top(|ui| {
                        for (piece, breakdown) in row {
                            self.render_card(ui, piece, breakdown, actions);
                        }
                    });
                    ui.add_space(theme::CARD_PADDING);
                }
            });
        });
    }

    fn render_card(&self, ui: &mut egui::Ui, piece: &Piece, b: &Breakdown, actions: &mut Vec<Action>) {
        let lang = self.lang();
        let mode = self.mode();
        let rules = self.session.rules();

        card_frame().show(ui, |ui| {
            ui.set_width(theme::CARD_MIN_WIDTH - 2.0 * theme::CARD_PADDING);

            Frame::none()
                .fill(theme::PRIMARY)
                .rounding(4.0)
                .inner_margin(10.0)
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.label(
                        RichText::new(piece_title(lang, piece.id))
                            .size(16.0)
                            .strong()
                            .color(Color32::WHITE),
                    );
                });
            ui.add_space(8.0);

            Frame::none()
                .fill(theme::INPUT_INFO_BG)
                .inner_margin(8.0)
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.label(RichText::new(input_recap(piece, b, mode, lang)).color(theme::DIM_TEXT));
                });
            ui.add_space(6.0);

            egui::Grid::new(("card_details", piece.id))
                .num_columns(2)
                .spacing([12.0, 4.0])
                .show(ui, |ui| {
                    for (label, value) in card_details(piece, b, rules, mode, lang) {
                        ui.label(RichText::new(label).color(theme::LABEL_TEXT));
                        ui.label(RichText::new(value).strong().color(theme::BODY_TEXT));
                        ui.end_row();
                    }
                });
            ui.add_space(8.0);

            Frame::none()
                .fill(theme::SUCCESS_BG)
                .inner_margin(10.0)
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.horizontal(|ui| {
                        ui.label(
                            RichText::new(tr(lang, Text::FinalPriceLabel))
                                .strong()
                                .color(theme::SUCCESS_TEXT),
                        );
                        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                            ui.label(
                                RichText::new(format_money(b.final_price))
                                    .size(18.0)
                                    .strong()
                                    .color(theme::SUCCESS),
                            );
                        });
                    });
                });
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                if ui
                    .add(filled_button(tr(lang, Text::Copy), theme::COPY_BUTTON))
                    .clicked()
                {
                    actions.push(Action::CopyPiece(piece.id));
                }
                if ui
                    .add(filled_button(tr(lang, Text::ReceiptImage), theme::RECEIPT_BUTTON))
                    .clicked()
                {
                    actions.push(Action::SaveReceipt(piece.id));
                }
            });
        });
    }

    /// Show the current dialog, if any.
    fn render_dialog(&self, ctx: &Context, actions: &mut Vec<Action>) {
        let Some(dialog) = &self.dialog else {
            return;
        };

        match dialog {
            Dialog::Message { title, body } => {
                egui::Window::new(title.as_str())
                    .collapsible(false)
                    .resizable(false)
                    .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
                    .show(ctx, |ui| {
                        ui.label(body.as_str());
                        ui.separator();
                        if ui.button(self.t(Text::Close)).clicked() {
                            actions.push(Action::CloseDialog);
                        }
                    });
            }
            Dialog::ConfirmDelete { id } => {
                egui::Window::new(self.t(Text::Confirm))
                    .collapsible(false)
                    .resizable(false)
                    .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
                    .show(ctx, |ui| {
                        ui.label(tr_fmt(
                            self.lang(),
                            Text::ConfirmDelete,
                            &[("id", &id.to_string())],
                        ));
                        ui.separator();
                        ui.horizontal(|ui| {
                            if ui.button(self.t(Text::Yes)).clicked() {
                                actions.push(Action::ConfirmDelete(*id));
                            }
                            if ui.button(self.t(Text::No)).clicked() {
                                actions.push(Action::CloseDialog);
                            }
                        });
                    });
            }
        }
    }

    /// Handle keyboard shortcuts.
    fn handle_keyboard(&self, ctx: &Context, actions: &mut Vec<Action>) {
        ctx.input(|i| {
            // Ctrl+Q: Quit
            if i.modifiers.ctrl && i.key_pressed(Key::Q) {
                actions.push(Action::Quit);
            }
            // Escape: dismiss dialog
            if i.key_pressed(Key::Escape) && self.dialog.is_some() {
                actions.push(Action::CloseDialog);
            }
        });
    }
}

impl eframe::App for CalculatorApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.viewport().close_requested()) {
            self.persist_current_rules();
            self.save_settings();
            tracing::info!("Closing {}", APP_NAME);
        }

        let mut actions = Vec::new();
        self.handle_keyboard(ctx, &mut actions);

        if self.screen != Screen::Splash {
            self.render_menu(ctx, &mut actions);
            self.render_status_bar(ctx);
        }
        match self.screen {
            Screen::Splash => self.render_splash(ctx),
            Screen::ModeSelect => self.render_mode_select(ctx, &mut actions),
            Screen::Input => self.render_input(ctx, &mut actions),
            Screen::Results => self.render_results(ctx, &mut actions),
        }
        self.render_dialog(ctx, &mut actions);

        for action in actions {
            self.apply(ctx, action);
        }
    }
}

// ==================== widgets ====================

fn card_frame() -> Frame {
    Frame::none()
        .fill(theme::CARD_BG)
        .stroke(egui::Stroke::new(1.0, theme::CARD_BORDER))
        .rounding(8.0)
        .inner_margin(theme::CARD_PADDING)
}

fn render_header(ctx: &Context, id: &'static str, title: &str) {
    TopBottomPanel::top(id)
        .exact_height(theme::HEADER_HEIGHT)
        .frame(Frame::none().fill(theme::PRIMARY).inner_margin(20.0))
        .show(ctx, |ui| {
            ui.with_layout(Layout::left_to_right(Align::Center), |ui| {
                ui.label(RichText::new(title).size(22.0).strong().color(Color32::WHITE));
            });
        });
}

fn filled_button(text: impl Into<String>, fill: Color32) -> egui::Button<'static> {
    egui::Button::new(RichText::new(text).strong().color(Color32::WHITE)).fill(fill)
}

fn rule_row(ui: &mut egui::Ui, label: &str, value: &mut String) {
    ui.label(RichText::new(label).color(theme::LABEL_TEXT));
    ui.add(TextEdit::singleline(value).desired_width(120.0));
    ui.end_row();
}

/// A labelled form field. Returns true when Enter was pressed in it.
fn form_row(ui: &mut egui::Ui, label: &str, value: &mut String) -> bool {
    ui.label(RichText::new(label).color(theme::LABEL_TEXT));
    let response = ui.add(TextEdit::singleline(value).desired_width(120.0));
    ui.end_row();
    response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter))
}

fn mode_name(lang: Language, mode: Mode) -> &'static str {
    match mode {
        Mode::ThreeD => tr(lang, Text::ModeThreeD),
        Mode::Laser => tr(lang, Text::ModeLaser),
    }
}

/// One-line description of a piece in the input list.
fn piece_summary(lang: Language, piece: &Piece, mode: Mode) -> String {
    let time = format!(
        "{}h {}min",
        format_quantity(piece.inputs.hours),
        format_quantity(piece.inputs.minutes)
    );
    if mode.uses_weight() {
        format!(
            "{}: {}g  |  {}",
            piece_title(lang, piece.id),
            format_quantity(piece.inputs.weight_grams),
            time
        )
    } else {
        format!("{}: {}", piece_title(lang, piece.id), time)
    }
}

/// Panel label for a rule field name reported by validation.
fn rule_label(field: &str) -> Option<Text> {
    match field {
        "gram_price" => Some(Text::RuleGramPrice),
        "normal_hour_price" => Some(Text::RuleNormalHour),
        "exceed_hour_price" => Some(Text::RuleExceedHour),
        "exceed_threshold" => Some(Text::RuleThreshold),
        "markup_percent" => Some(Text::RuleMarkup),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabricost_core::PieceInputs;

    #[test]
    fn test_rule_label_covers_rule_fields() {
        for (field, _) in fabricost_core::RuleSet::FACTORY_3D.fields() {
            assert!(rule_label(field).is_some(), "{}", field);
        }
        assert_eq!(rule_label("bogus"), None);
    }

    #[test]
    fn test_piece_summary() {
        let piece = Piece::new(2, PieceInputs::new(12.5, 1.0, 5.0));
        assert_eq!(
            piece_summary(Language::En, &piece, Mode::ThreeD),
            "Piece 2: 12.5g  |  1h 5min"
        );
        assert_eq!(
            piece_summary(Language::En, &piece, Mode::Laser),
            "Piece 2: 1h 5min"
        );
    }
}
