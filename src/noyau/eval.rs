//! Noyau — évaluation (machine à pile)
//!
//! Un seul parcours du programme postfixé, paramétré par la représentation numérique :
//! - f64    : mode rapide (règles flottantes, aucune allocation par jeton)
//! - Nombre : mode exact (règles exactes si présentes, sinon repli flottant)
//!
//! Monomorphisé : le mode rapide ne paie aucune indirection dynamique sur la représentation.

use super::erreurs::ErreurEvaluation;
use super::jetons::Jeton;
use super::nombre::{Litteral, Nombre};
use super::registre::{Fonction, Operateur};

/// Opérations numériques dont la machine à pile a besoin.
pub trait Representation: Sized {
    fn litteral(l: &Litteral) -> Self;

    /// `args` dans l’ordre déclaré : [gauche, droite] pour un binaire.
    fn operateur(op: &Operateur, args: &[Self]) -> Self;

    /// `args[0]` = le plus profond des N dépilés.
    fn fonction(f: &Fonction, args: &[Self]) -> Self;
}

impl Representation for f64 {
    fn litteral(l: &Litteral) -> Self {
        l.reel()
    }

    fn operateur(op: &Operateur, args: &[Self]) -> Self {
        op.appliquer(args)
    }

    fn fonction(f: &Fonction, args: &[Self]) -> Self {
        f.appliquer(args)
    }
}

impl Representation for Nombre {
    fn litteral(l: &Litteral) -> Self {
        l.nombre()
    }

    fn operateur(op: &Operateur, args: &[Self]) -> Self {
        op.appliquer_exact(args)
    }

    fn fonction(f: &Fonction, args: &[Self]) -> Self {
        f.appliquer_exact(args)
    }
}

/// Remplace les `n` valeurs du sommet par `f(valeurs)` (ordre de la pile conservé).
fn reduire<R>(pile: &mut Vec<R>, n: usize, f: impl FnOnce(&[R]) -> R) {
    let debut = pile.len() - n;
    let r = f(&pile[debut..]);
    pile.truncate(debut);
    pile.push(r);
}

/// Exécute un programme postfixé.
///
/// - `variable(nom)` : valeur liée, None si non liée
/// - la pile doit contenir exactement une valeur à la fin
pub fn executer<R: Representation>(
    programme: &[Jeton],
    variable: impl Fn(&str) -> Option<R>,
) -> Result<R, ErreurEvaluation> {
    let mut pile: Vec<R> = Vec::with_capacity(programme.len());

    for jeton in programme {
        match jeton {
            Jeton::Nombre(l) => pile.push(R::litteral(l)),

            Jeton::Variable(nom) => {
                let v = variable(nom)
                    .ok_or_else(|| ErreurEvaluation::VariableNonLiee(nom.clone()))?;
                pile.push(v);
            }

            Jeton::Operateur(op) => {
                let n = op.arite().nb_operandes();
                if pile.len() < n {
                    return Err(ErreurEvaluation::OperandesInsuffisants(
                        op.symbole().to_string(),
                    ));
                }
                reduire(&mut pile, n, |args| R::operateur(op, args));
            }

            Jeton::Fonction { def, nb_args } => {
                let n = def
                    .arguments_consommes(*nb_args)
                    .filter(|&n| n <= pile.len())
                    .ok_or_else(|| ErreurEvaluation::ArgumentsInsuffisants(def.nom().to_string()))?;
                reduire(&mut pile, n, |args| R::fonction(def, args));
            }

            Jeton::Marqueur(_) => return Err(ErreurEvaluation::MarqueurInattendu),
        }
    }

    match pile.len() {
        0 => Err(ErreurEvaluation::ProgrammeVide),
        1 => pile.pop().ok_or(ErreurEvaluation::ProgrammeVide),
        _ => Err(ErreurEvaluation::OperandesEnTrop),
    }
}
