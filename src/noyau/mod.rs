//! Noyau — analyse et évaluation d’expressions infixes
//!
//! Organisation interne :
//! - erreurs.rs    : taxonomie des erreurs (lexicale / syntaxe / évaluation)
//! - nombre.rs     : Nombre (rationnel exact | réel) + littéraux
//! - registre.rs   : opérateurs, fonctions, registre global
//! - jetons.rs     : modèle de jetons + tokenisation
//! - rpn.rs        : shunting-yard (infixe -> postfixe)
//! - eval.rs       : machine à pile générique (f64 | Nombre)
//! - expression.rs : Expression (programme + liaisons), validate, parse
//! - format.rs     : rendu des jetons et des décimaux tronqués

pub mod erreurs;
pub mod eval;
pub mod expression;
pub mod format;
pub mod jetons;
pub mod nombre;
pub mod registre;
pub mod rpn;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_fuzz_safe;

// API publique
pub use erreurs::{
    ConflitDeNom, ErreurAnalyse, ErreurEvaluation, ErreurLexicale, ErreurRegistre, ErreurSyntaxe,
};
pub use expression::{parse, parse_avec, Expression, Validation};
pub use jetons::{tokenize, Jeton, Options};
pub use nombre::{to_f64, Nombre};
pub use registre::{Arite, Associativite, Fonction, NbArguments, Operateur, Registre};
pub use rpn::to_rpn;
