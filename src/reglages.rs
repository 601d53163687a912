// src/reglages.rs
//
// Réglages utilisateur (fichier TOML, défauts surchargeables par l’environnement)
//
// Exemple de calculatrice.toml :
//   multiplication_implicite = true
//   chiffres = 30
//   [variables]
//   g = 9.81

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::noyau::erreurs::ConflitDeNom;
use crate::noyau::expression::Expression;
use crate::noyau::jetons::Options;

/// Au-delà, l’affichage décimal devient illisible (et coûteux en BigInt).
pub const CHIFFRES_MAX: usize = 200;

#[derive(Debug, Error)]
pub enum ErreurReglages {
    #[error("cannot read settings file {chemin}: {source}")]
    Lecture {
        chemin: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    Format(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reglages {
    /// Insère '*' entre deux valeurs adjacentes ("2x", "(1)(2)").
    pub multiplication_implicite: bool,

    /// Chiffres après la virgule pour l’affichage décimal du résultat exact.
    pub chiffres: usize,

    /// Liaisons ajoutées à chaque expression analysée.
    pub variables: BTreeMap<String, f64>,
}

impl Default for Reglages {
    fn default() -> Self {
        Self {
            multiplication_implicite: env::var("CALC_MULTIPLICATION_IMPLICITE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            chiffres: env::var("CALC_CHIFFRES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(20),
            variables: BTreeMap::new(),
        }
    }
}

impl Reglages {
    pub fn depuis_toml(texte: &str) -> Result<Self, ErreurReglages> {
        let mut r: Reglages = toml::from_str(texte)?;
        r.chiffres = r.chiffres.min(CHIFFRES_MAX);
        Ok(r)
    }

    pub fn charger(chemin: impl AsRef<Path>) -> Result<Self, ErreurReglages> {
        let chemin = chemin.as_ref();
        let texte = std::fs::read_to_string(chemin).map_err(|source| ErreurReglages::Lecture {
            chemin: chemin.to_path_buf(),
            source,
        })?;
        let r = Self::depuis_toml(&texte)?;
        debug!("réglages chargés depuis {}", chemin.display());
        Ok(r)
    }

    /// Fichier absent => défauts silencieux ; fichier invalide => défauts + avertissement.
    pub fn charger_ou_defaut(chemin: impl AsRef<Path>) -> Self {
        let chemin = chemin.as_ref();
        if !chemin.exists() {
            return Self::default();
        }
        Self::charger(chemin).unwrap_or_else(|e| {
            warn!("{e}");
            Self::default()
        })
    }

    pub fn options(&self) -> Options {
        Options {
            variables: None,
            multiplication_implicite: self.multiplication_implicite,
        }
    }

    /// Lie les variables des réglages (tout ou rien).
    pub fn appliquer(&self, expression: &mut Expression) -> Result<(), ConflitDeNom> {
        expression.set_variables(self.variables.iter().map(|(n, v)| (n.as_str(), *v)))?;
        Ok(())
    }
}
