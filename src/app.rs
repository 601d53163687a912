// src/app.rs
//
// Calculatrice RPN — fenêtre principale
//
// etat.rs porte l’état (entrée, liaisons, résultats, démarche), vue.rs le dessin
// et l’appel au noyau. Ce fichier ne fait que brancher les deux sur eframe.
//
// Clavier global :
// - Échap       : efface l’entrée (bouton "C")
// - Maj + Échap : remet tout à zéro, liaisons comprises (bouton "AC")
// Entrée et retour arrière restent gérés par le champ de saisie lui-même.

pub mod etat;
pub mod vue;

pub use etat::AppCalc;

use eframe::egui;

/// Action déclenchée par les raccourcis globaux.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Raccourci {
    EffacerEntree,
    ToutEffacer,
}

fn raccourci(echap: bool, maj: bool) -> Option<Raccourci> {
    match (echap, maj) {
        (false, _) => None,
        (true, false) => Some(Raccourci::EffacerEntree),
        (true, true) => Some(Raccourci::ToutEffacer),
    }
}

impl AppCalc {
    fn appliquer_raccourci(&mut self, r: Raccourci) {
        match r {
            Raccourci::EffacerEntree => self.clear_entree(),
            Raccourci::ToutEffacer => self.reset_total(),
        }
    }
}

impl eframe::App for AppCalc {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let r = ctx.input(|i| raccourci(i.key_pressed(egui::Key::Escape), i.modifiers.shift));
        if let Some(r) = r {
            self.appliquer_raccourci(r);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.ui(ui);
        });
    }
}
