// src/app/vue.rs
//
// Vue (UI egui) — natif + web
// ---------------------------
// Objectifs :
// - Même AppCalc (etat.rs) pour natif + wasm
// - Clavier : Enter évalue, Backspace efface (quand le champ est focus)
// - Tactile : gros boutons, focus redonné après clic (focus_entree)
// - Liaisons de variables : une par ligne, `nom = expression`
//
// Note :
// - PAS de Key::NumEnter (n’existe pas dans egui 0.33.x)

use eframe::egui;

use calculatrice_rpn::noyau::format::{format_decimal, format_jetons};
use calculatrice_rpn::noyau::{parse_avec, to_rpn, tokenize, Expression, Registre};
use calculatrice_rpn::reglages::CHIFFRES_MAX;

use super::etat::AppCalc;

impl AppCalc {
    /// UI principale : à appeler depuis eframe::App::update(...)
    pub fn ui(&mut self, ui: &mut egui::Ui) {
        ui.spacing_mut().item_spacing = egui::vec2(6.0, 6.0);

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading("Calculatrice RPN");
                ui.add_space(6.0);

                self.ui_entree(ui);

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                self.ui_variables(ui);

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                self.ui_resultats(ui);

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                self.ui_demarche(ui);
            });
    }

    fn ui_entree(&mut self, ui: &mut egui::Ui) {
        ui.label("Entrée :");

        let resp = ui.add(
            egui::TextEdit::singleline(&mut self.entree)
                .desired_width(ui.available_width())
                .hint_text("Ex: 3 * x + max(1, y, 2), -2^2, atan2(1, 1)")
                .id_source("entree_edit")
                .code_editor(),
        );

        if self.focus_entree {
            resp.request_focus();
            self.focus_entree = false;
        }

        let enter = ui.input(|i| i.key_pressed(egui::Key::Enter));
        if resp.has_focus() && enter {
            self.eval_via_noyau();
            self.focus_entree = true;
        }

        // TextEdit gère déjà Backspace “normal” ; ici on retire les motifs complets ("sin(", "pi").
        let backspace = ui.input(|i| i.key_pressed(egui::Key::Backspace));
        if resp.has_focus() && backspace {
            self.backspace_entree();
            self.focus_entree = true;
        }

        ui.add_space(6.0);

        ui.horizontal(|ui| {
            // C = entrée seulement ; CLR = résultats seulement ; AC = tout
            self.bouton_action(ui, "C", "Efface seulement l’entrée", Action::ClearEntree);
            self.bouton_action(
                ui,
                "CLR",
                "Efface résultats + validation + démarche",
                Action::ClearResultats,
            );
            self.bouton_action(ui, "AC", "Remise à zéro totale", Action::ResetTotal);

            ui.separator();

            ui.label("Décimal :");
            let mut d = self.digits as u32;
            let resp = ui.add(
                egui::DragValue::new(&mut d)
                    .speed(1)
                    .range(0..=CHIFFRES_MAX as u32)
                    .suffix(" chiffres"),
            );
            if resp.changed() {
                self.set_digits(d as usize);
            }
        });

        ui.add_space(8.0);

        ui.horizontal_wrapped(|ui| {
            self.bouton_insert(ui, "(", "(", InsertKind::OpenParen);
            self.bouton_insert(ui, ")", ")", InsertKind::CloseParen);
            self.bouton_insert(ui, ",", ", ", InsertKind::Digit);

            self.bouton_insert(ui, "+", "+", InsertKind::Op);
            self.bouton_insert(ui, "-", "-", InsertKind::Op);
            self.bouton_insert(ui, "*", "*", InsertKind::Op);
            self.bouton_insert(ui, "/", "/", InsertKind::Op);
            self.bouton_insert(ui, "%", "%", InsertKind::Op);
            self.bouton_insert(ui, "^", "^", InsertKind::Op);

            ui.separator();

            self.bouton_insert(ui, "pi", "pi", InsertKind::Word);
            self.bouton_insert(ui, "sqrt", "sqrt(", InsertKind::Func);
            self.bouton_insert(ui, "sin", "sin(", InsertKind::Func);
            self.bouton_insert(ui, "cos", "cos(", InsertKind::Func);
            self.bouton_insert(ui, "log", "log(", InsertKind::Func);
            self.bouton_insert(ui, "max", "max(", InsertKind::Func);
            self.bouton_insert(ui, "min", "min(", InsertKind::Func);

            ui.separator();

            self.bouton_insert(ui, "x", "x", InsertKind::Word);
            self.bouton_insert(ui, "y", "y", InsertKind::Word);

            ui.add_space(10.0);

            let eq = ui.add_sized([64.0, 32.0], egui::Button::new("="));
            if eq.clicked() {
                self.eval_via_noyau();
                self.focus_entree = true;
            }
        });

        ui.add_space(8.0);

        self.ui_pave_numerique(ui);

        if !self.erreur.is_empty() {
            ui.add_space(6.0);
            ui.colored_label(ui.visuals().error_fg_color, &self.erreur);
        }
    }

    fn ui_pave_numerique(&mut self, ui: &mut egui::Ui) {
        egui::Grid::new("pave_numerique")
            .num_columns(4)
            .spacing([6.0, 6.0])
            .show(ui, |ui| {
                self.bouton_insert(ui, "7", "7", InsertKind::Digit);
                self.bouton_insert(ui, "8", "8", InsertKind::Digit);
                self.bouton_insert(ui, "9", "9", InsertKind::Digit);
                self.bouton_action(ui, "DEL", "Efface le dernier symbole", Action::Backspace);
                ui.end_row();

                self.bouton_insert(ui, "4", "4", InsertKind::Digit);
                self.bouton_insert(ui, "5", "5", InsertKind::Digit);
                self.bouton_insert(ui, "6", "6", InsertKind::Digit);
                self.bouton_insert(ui, "e", "e", InsertKind::Word);
                ui.end_row();

                self.bouton_insert(ui, "1", "1", InsertKind::Digit);
                self.bouton_insert(ui, "2", "2", InsertKind::Digit);
                self.bouton_insert(ui, "3", "3", InsertKind::Digit);
                self.bouton_insert(ui, ".", ".", InsertKind::Digit);
                ui.end_row();

                self.bouton_insert(ui, "0", "0", InsertKind::Digit);
                ui.label("");
                ui.label("");
                ui.label("");
                ui.end_row();
            });
    }

    fn ui_variables(&mut self, ui: &mut egui::Ui) {
        ui.label("Variables (une par ligne) :");
        ui.add(
            egui::TextEdit::multiline(&mut self.variables)
                .desired_width(ui.available_width())
                .desired_rows(3)
                .hint_text("x = 2\ny = 1/3")
                .id_source("variables_edit")
                .code_editor(),
        );
    }

    /// Backspace “intelligent” : retire d’un coup les motifs utiles ("sin(", "pi", etc.).
    fn backspace_entree(&mut self) {
        if self.entree.is_empty() {
            return;
        }

        while self.entree.ends_with(' ') {
            self.entree.pop();
        }

        for pat in ["sqrt(", "sin(", "cos(", "log(", "max(", "min(", "pi"] {
            if self.entree.ends_with(pat) {
                for _ in 0..pat.chars().count() {
                    self.entree.pop();
                }
                while self.entree.ends_with(' ') {
                    self.entree.pop();
                }
                return;
            }
        }

        self.entree.pop();
        while self.entree.ends_with(' ') {
            self.entree.pop();
        }
    }

    fn ui_resultats(&mut self, ui: &mut egui::Ui) {
        ui.label("Rapide (f64) :");
        Self::champ_monospace(ui, "rapide_out", &self.rapide, 1);

        ui.add_space(6.0);

        ui.label("Exact :");
        Self::champ_monospace(ui, "exact_out", &self.exact, 2);

        ui.add_space(6.0);

        ui.label("Décimal :");
        if self.lecture_dispo {
            Self::champ_monospace(ui, "decimal_out", &self.lecture, 2);
        } else {
            ui.monospace("indisponible");
        }

        if !self.validation.is_empty() {
            ui.add_space(6.0);
            ui.label("Validation :");
            for msg in &self.validation {
                ui.colored_label(ui.visuals().warn_fg_color, format!("• {msg}"));
            }
        }
    }

    fn ui_demarche(&mut self, ui: &mut egui::Ui) {
        egui::CollapsingHeader::new("Démarche")
            .default_open(true)
            .show(ui, |ui| {
                Self::champ_demarche(ui, "Jetons", "demarche_jetons", &self.demarche.jetons);
                Self::champ_demarche(ui, "RPN", "demarche_rpn", &self.demarche.rpn);
                Self::champ_demarche(ui, "Liaisons", "demarche_liaisons", &self.demarche.liaisons);
            });
    }

    fn champ_demarche(ui: &mut egui::Ui, titre: &str, id: &str, contenu: &str) {
        ui.add_space(4.0);
        ui.label(format!("{titre} :"));
        Self::champ_monospace(ui, id, contenu, 2);
    }

    fn champ_monospace(ui: &mut egui::Ui, id: &str, contenu: &str, rows: usize) {
        egui::Frame::group(ui.style())
            .fill(ui.visuals().extreme_bg_color)
            .show(ui, |ui| {
                ui.push_id(id, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.set_min_height(
                        rows as f32 * ui.text_style_height(&egui::TextStyle::Monospace),
                    );
                    ui.monospace(contenu);
                });
            });
    }

    fn bouton_action(&mut self, ui: &mut egui::Ui, label: &str, tip: &str, action: Action) {
        let resp = ui
            .add_sized([56.0, 30.0], egui::Button::new(label))
            .on_hover_text(tip);

        if resp.clicked() {
            match action {
                Action::ClearEntree => self.clear_entree(),
                Action::ClearResultats => self.clear_resultats(),
                Action::ResetTotal => self.reset_total(),
                Action::Backspace => self.backspace_entree(),
            }
            self.focus_entree = true;
        }
    }

    fn bouton_insert(&mut self, ui: &mut egui::Ui, label: &str, to_insert: &str, kind: InsertKind) {
        let resp = ui.add_sized([46.0, 28.0], egui::Button::new(label));
        if !resp.clicked() || to_insert.is_empty() {
            return;
        }

        match kind {
            InsertKind::CloseParen => {
                while self.entree.ends_with(' ') {
                    self.entree.pop();
                }
                self.entree.push_str(to_insert);
            }
            InsertKind::OpenParen | InsertKind::Func => {
                let last = self.entree.chars().rev().find(|c| !c.is_whitespace());
                if let Some(c) = last {
                    if c.is_ascii_digit() || c.is_alphabetic() || c == ')' {
                        self.entree.push(' ');
                    }
                }
                self.entree.push_str(to_insert);
            }
            InsertKind::Op => {
                while self.entree.ends_with(' ') {
                    self.entree.pop();
                }
                if !self.entree.is_empty() {
                    self.entree.push(' ');
                }
                self.entree.push_str(to_insert);
                self.entree.push(' ');
            }
            InsertKind::Digit => {
                self.entree.push_str(to_insert);
            }
            InsertKind::Word => {
                // "2x" est une multiplication implicite : on sépare quand même pour la lisibilité
                if !self.entree.ends_with(char::is_whitespace) {
                    let last = self.entree.chars().rev().find(|c| !c.is_whitespace());
                    if let Some(c) = last {
                        if c.is_alphanumeric() || c == ')' {
                            self.entree.push(' ');
                        }
                    }
                }
                self.entree.push_str(to_insert);
            }
        }

        self.focus_entree = true;
    }

    /// Lie les variables de réglages puis celles du panneau ; chaque valeur est elle-même
    /// une expression évaluée en mode exact ("x = 1/3" reste rationnel).
    fn lier_variables(&self, expression: &mut Expression) -> Result<String, String> {
        let registre = Registre::global();
        let options = self.reglages.options();

        self.reglages
            .appliquer(expression)
            .map_err(|e| format!("réglages : {e}"))?;

        let mut resume = Vec::new();
        for (ligne, nom, texte) in self.lignes_variables() {
            if texte.is_empty() {
                return Err(format!("ligne {ligne} : valeur manquante pour '{nom}'"));
            }
            let valeur = parse_avec(texte, registre, &options)
                .map_err(|e| format!("ligne {ligne} : {e}"))?
                .evaluate_exact()
                .map_err(|e| format!("ligne {ligne} : {e}"))?;

            resume.push(format!("{nom} = {valeur}"));
            expression
                .set_variable_exact(nom, valeur)
                .map_err(|e| format!("ligne {ligne} : {e}"))?;
        }
        Ok(resume.join(", "))
    }

    /// Évalue l’expression via le noyau, puis dépose résultats/validation/démarche dans l’état UI.
    fn eval_via_noyau(&mut self) {
        self.validation.clear();
        self.demarche = Default::default();

        let s = self.entree.trim().to_string();
        if s.is_empty() {
            self.set_erreur("Entrée vide");
            return;
        }

        let registre = Registre::global();
        let options = self.reglages.options();

        let jetons = match tokenize(&s, registre, &options) {
            Ok(j) => j,
            Err(e) => {
                let pointe = s.chars().skip(e.position()).take(12).collect::<String>();
                self.set_erreur(format!("{e} ⟶ « {pointe} »"));
                return;
            }
        };
        self.demarche.jetons = format_jetons(&jetons);

        let programme = match to_rpn(&jetons) {
            Ok(p) => p,
            Err(e) => {
                self.set_erreur(e.to_string());
                return;
            }
        };
        self.demarche.rpn = format_jetons(&programme);

        let mut expression = Expression::depuis_postfixe(programme, registre);
        match self.lier_variables(&mut expression) {
            Ok(resume) => self.demarche.liaisons = resume,
            Err(msg) => {
                self.set_erreur(msg);
                return;
            }
        }

        let validation = expression.validate(true);
        if !validation.est_valide() {
            self.validation = validation.erreurs().to_vec();
            self.set_erreur("expression invalide");
            return;
        }

        let rapide = match expression.evaluate() {
            Ok(v) => v,
            Err(e) => {
                self.set_erreur(e.to_string());
                return;
            }
        };

        match expression.evaluate_exact() {
            Ok(n) => {
                let lecture = n.est_exact().then(|| format_decimal(&n, self.digits));
                self.set_resultats(rapide.to_string(), n.to_string(), lecture);
            }
            Err(e) => self.set_erreur(e.to_string()),
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Action {
    ClearEntree,
    ClearResultats,
    ResetTotal,
    Backspace,
}

#[derive(Clone, Copy, Debug)]
enum InsertKind {
    Digit,
    Word,
    Func,
    Op,
    OpenParen,
    CloseParen,
}
