// src/noyau/erreurs.rs
//
// Taxonomie des erreurs du noyau.
// - Lexicale   : texte mal formé (position = indice de caractère, pas d’octet)
// - Syntaxe    : ordre des jetons incohérent (parenthèses, séparateurs, arité)
// - Analyse    : union des deux, retour de parse()
// - ConflitDeNom : variable homonyme d’une fonction
// - Evaluation : échec de la machine à pile
//
// Aucune de ces erreurs n’est journalisée à la place d’être retournée.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErreurLexicale {
    #[error("unexpected character '{caractere}' at offset {position}")]
    CaractereInattendu { caractere: char, position: usize },

    #[error("malformed number literal '{texte}' at offset {position}")]
    NombreMalForme { texte: String, position: usize },

    #[error("unknown identifier '{nom}' at offset {position}")]
    IdentifiantInconnu { nom: String, position: usize },

    #[error("operator '{symbole}' cannot be used here (offset {position})")]
    OperateurInconnu { symbole: String, position: usize },

    #[error("function '{nom}' must be followed by '(' (offset {position})")]
    FonctionSansParenthese { nom: String, position: usize },
}

impl ErreurLexicale {
    /// Indice (en caractères) du symbole fautif dans le texte.
    pub fn position(&self) -> usize {
        match self {
            ErreurLexicale::CaractereInattendu { position, .. }
            | ErreurLexicale::NombreMalForme { position, .. }
            | ErreurLexicale::IdentifiantInconnu { position, .. }
            | ErreurLexicale::OperateurInconnu { position, .. }
            | ErreurLexicale::FonctionSansParenthese { position, .. } => *position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErreurSyntaxe {
    #[error("empty expression")]
    ExpressionVide,

    #[error("misplaced separator or unmatched parenthesis")]
    SeparateurMalPlace,

    #[error("unmatched parenthesis")]
    ParentheseNonAppariee,

    #[error("function '{nom}' expects {attendus} argument(s), got {recus}")]
    NombreArgumentsInvalide {
        nom: String,
        attendus: String,
        recus: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErreurAnalyse {
    #[error(transparent)]
    Lexicale(#[from] ErreurLexicale),

    #[error(transparent)]
    Syntaxe(#[from] ErreurSyntaxe),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("the variable name '{nom}' is invalid, a function with the same name exists")]
pub struct ConflitDeNom {
    pub nom: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErreurEvaluation {
    #[error("unbound variable {0}")]
    VariableNonLiee(String),

    #[error("insufficient operands for {0}")]
    OperandesInsuffisants(String),

    #[error("insufficient arguments for {0}")]
    ArgumentsInsuffisants(String),

    #[error("malformed program: extra operands remain")]
    OperandesEnTrop,

    #[error("malformed program: nothing to evaluate")]
    ProgrammeVide,

    #[error("malformed program: grouping marker in postfix program")]
    MarqueurInattendu,

    #[error("evaluation task did not complete: {0}")]
    TacheInterrompue(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErreurRegistre {
    #[error("invalid function name '{0}'")]
    NomFonctionInvalide(String),

    #[error("invalid operator symbol '{0}'")]
    SymboleInvalide(String),
}
