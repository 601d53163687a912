//! Calculatrice RPN : analyse d’expressions infixes, conversion postfixe,
//! évaluation rapide (f64) ou exacte (rationnels).
//!
//! ```
//! let mut e = calculatrice_rpn::parse("3 * x + 1").unwrap();
//! e.set_variable("x", 2.0).unwrap();
//! assert_eq!(e.evaluate(), Ok(7.0));
//! ```

pub mod noyau;
pub mod reglages;

pub use noyau::{
    parse, parse_avec, to_f64, to_rpn, tokenize, ConflitDeNom, ErreurAnalyse, ErreurEvaluation,
    ErreurLexicale, ErreurSyntaxe, Expression, Jeton, Nombre, Options, Registre, Validation,
};
pub use reglages::Reglages;
