//! src/app/etat.rs
//!
//! État UI (sans vue, sans noyau).
//!
//! Rôle : contenir l’état de la calculatrice (entrée, liaisons, résultats, validation,
//! démarche) et offrir des opérations simples (C/CLR/AC) sans logique d’affichage.
//!
//! Contrats :
//! - Aucune évaluation ici (pas de parsing).
//! - Actions déterministes, sans effet de bord caché.
//! - Bornes sur la précision décimale (chiffres).

use calculatrice_rpn::reglages::{Reglages, CHIFFRES_MAX};

#[derive(Clone, Default, Debug)]
pub struct Demarche {
    pub jetons: String,
    pub rpn: String,
    pub liaisons: String,
}

#[derive(Clone, Debug)]
pub struct AppCalc {
    // --- entrée utilisateur ---
    pub entree: String,
    /// Une liaison par ligne : `nom = expression`.
    pub variables: String,

    // --- sorties ---
    pub rapide: String,      // évaluation f64
    pub exact: String,       // évaluation exacte (n/d ou réel)
    pub lecture: String,     // décimal tronqué du résultat exact
    pub erreur: String,      // message d’erreur (analyse / liaison / évaluation)
    pub validation: Vec<String>,
    pub lecture_dispo: bool, // false si évaluation impossible ou vide

    // --- démarche (panneau d’explication) ---
    pub demarche: Demarche,

    // --- paramètres ---
    pub reglages: Reglages,
    pub digits: usize,

    // --- UX ---
    // Permet à vue.rs de redonner le focus à l’entrée après un clic sur un bouton.
    pub focus_entree: bool,
}

impl Default for AppCalc {
    fn default() -> Self {
        Self::depuis_reglages(Reglages::default())
    }
}

impl AppCalc {
    pub fn depuis_reglages(reglages: Reglages) -> Self {
        Self {
            entree: String::new(),
            variables: String::new(),
            rapide: String::new(),
            exact: String::new(),
            lecture: String::new(),
            erreur: String::new(),
            validation: Vec::new(),
            lecture_dispo: false, // au démarrage : rien à lire
            demarche: Demarche::default(),
            digits: reglages.chiffres.min(CHIFFRES_MAX),
            reglages,
            focus_entree: true, // au lancement, on veut pouvoir taper tout de suite
        }
    }

    /* ------------------------ Actions “boutons” (état seulement) ------------------------ */

    /// AC : remise à zéro totale (entrée + liaisons + résultats + précision des réglages).
    pub fn reset_total(&mut self) {
        self.entree.clear();
        self.variables.clear();
        self.clear_resultats();
        self.digits = self.reglages.chiffres.min(CHIFFRES_MAX);
        self.focus_entree = true;
    }

    /// C : effacer seulement l’entrée (sans toucher aux résultats).
    pub fn clear_entree(&mut self) {
        self.entree.clear();
        self.focus_entree = true;
    }

    /// CLR : effacer résultats + erreur + validation + démarche (sans toucher à l’entrée).
    pub fn clear_resultats(&mut self) {
        self.rapide.clear();
        self.exact.clear();
        self.lecture.clear();
        self.erreur.clear();
        self.validation.clear();
        self.lecture_dispo = false;
        self.demarche = Demarche::default();
        self.focus_entree = true;
    }

    /// On CONSERVE la démarche : les jetons restent utiles pour comprendre la faute.
    pub fn set_erreur(&mut self, msg: impl Into<String>) {
        self.erreur = msg.into();
        self.rapide.clear();
        self.exact.clear();
        self.lecture.clear();
        self.lecture_dispo = false;
        self.focus_entree = true;
    }

    pub fn set_resultats(&mut self, rapide: String, exact: String, lecture: Option<String>) {
        self.erreur.clear();
        self.rapide = rapide;
        self.exact = exact;

        if let Some(v) = lecture {
            self.lecture_dispo = true;
            self.lecture = v;
        } else {
            self.lecture_dispo = false;
            self.lecture.clear();
        }

        self.focus_entree = true;
    }

    pub fn set_digits(&mut self, digits: usize) {
        self.digits = digits.min(CHIFFRES_MAX);
        self.focus_entree = true;
    }

    /// Lignes `nom = texte` non vides ; une ligne sans '=' est rendue avec un texte vide.
    pub fn lignes_variables(&self) -> Vec<(usize, &str, &str)> {
        self.variables
            .lines()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty())
            .map(|(i, l)| match l.split_once('=') {
                Some((nom, valeur)) => (i + 1, nom.trim(), valeur.trim()),
                None => (i + 1, l.trim(), ""),
            })
            .collect()
    }
}
