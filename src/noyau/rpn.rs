// src/noyau/rpn.rs
//
// Shunting-yard -> RPN
// Objectif:
// - Convertir une suite de Jeton (infixe) en programme postfixé
//
// Règles:
// - Nombre / Variable : sortie directe
// - Fonction : empilée, sortie après sa parenthèse fermante (avec son nombre réel d’arguments)
// - Opérateur : dépile tant que le sommet est un opérateur plus prioritaire
//   (ou de même priorité si l’entrant est associatif à gauche)
// - Unaire préfixe : empilé sans rien dépiler (il n’a pas encore son opérande)
//
// NOTE:
// - Les marqueurs ( ) , ne sortent jamais : le programme final n’en contient aucun.

use super::erreurs::ErreurSyntaxe;
use super::jetons::{Jeton, Marqueur};
use super::registre::{Arite, Associativite, Operateur};

/// Une paire de parenthèses ouverte : comptage des arguments.
#[derive(Default)]
struct Cadre {
    separateurs: usize,
    // au moins un jeton depuis '(' : "f()" => 0 argument
    contenu: bool,
    // ',' vient d’être lu, un argument est attendu
    attend_argument: bool,
}

impl Cadre {
    fn nb_arguments(&self) -> usize {
        if self.contenu {
            self.separateurs + 1
        } else {
            0
        }
    }
}

/// Doit-on sortir l’opérateur du sommet avant d’empiler `entrant` ?
fn doit_depiler(sommet: &Operateur, entrant: &Operateur) -> bool {
    sommet.precedence() > entrant.precedence()
        || (sommet.precedence() == entrant.precedence()
            && entrant.associativite() == Associativite::Gauche)
}

/// Convertit une suite de jetons en RPN (notation polonaise inversée).
///
/// Exemple:
///   jetons: [2, +, 3, *, 4]
///   rpn:    [2, 3, 4, *, +]
pub fn to_rpn(jetons: &[Jeton]) -> Result<Vec<Jeton>, ErreurSyntaxe> {
    if jetons.is_empty() {
        return Err(ErreurSyntaxe::ExpressionVide);
    }

    let mut out: Vec<Jeton> = Vec::with_capacity(jetons.len());
    let mut ops: Vec<Jeton> = Vec::new();
    let mut cadres: Vec<Cadre> = Vec::new();

    // même notion que dans le tokenizer : sert à distinguer unaire préfixe / postfixe
    let mut attend_operande = true;

    for tok in jetons.iter().cloned() {
        // tout jeton autre que ')' et ',' remplit la parenthèse courante
        if !matches!(
            tok,
            Jeton::Marqueur(Marqueur::ParentheseFermante | Marqueur::Separateur)
        ) {
            if let Some(cadre) = cadres.last_mut() {
                cadre.contenu = true;
                cadre.attend_argument = false;
            }
        }

        match tok {
            Jeton::Nombre(_) | Jeton::Variable(_) => {
                out.push(tok);
                attend_operande = false;
            }

            Jeton::Fonction { .. } => {
                // fonction : on la garde sur la pile (elle sortira après ses arguments)
                ops.push(tok);
                attend_operande = true;
            }

            Jeton::Operateur(op) => {
                let prefixe = op.arite() == Arite::Unaire && attend_operande;

                if !prefixe {
                    while let Some(Jeton::Operateur(sommet)) = ops.last() {
                        if !doit_depiler(sommet, &op) {
                            break;
                        }
                        if let Some(t) = ops.pop() {
                            out.push(t);
                        }
                    }
                }

                attend_operande = op.arite() == Arite::Binaire || prefixe;
                ops.push(Jeton::Operateur(op));
            }

            Jeton::Marqueur(Marqueur::ParentheseOuvrante) => {
                ops.push(tok);
                cadres.push(Cadre::default());
                attend_operande = true;
            }

            Jeton::Marqueur(Marqueur::Separateur) => {
                if !depiler_jusqu_a_ouvrante(&mut ops, &mut out) {
                    return Err(ErreurSyntaxe::SeparateurMalPlace);
                }

                let cadre = cadres.last_mut().ok_or(ErreurSyntaxe::SeparateurMalPlace)?;
                // "f(,1)" ou "f(1,,2)"
                if !cadre.contenu || cadre.attend_argument {
                    return Err(ErreurSyntaxe::SeparateurMalPlace);
                }
                cadre.separateurs += 1;
                cadre.attend_argument = true;
                attend_operande = true;
            }

            Jeton::Marqueur(Marqueur::ParentheseFermante) => {
                if !depiler_jusqu_a_ouvrante(&mut ops, &mut out) {
                    return Err(ErreurSyntaxe::ParentheseNonAppariee);
                }
                // on retire la '(' elle-même
                ops.pop();

                let cadre = cadres.pop().ok_or(ErreurSyntaxe::ParentheseNonAppariee)?;
                if cadre.attend_argument {
                    // "f(1,)"
                    return Err(ErreurSyntaxe::SeparateurMalPlace);
                }

                // si une fonction est au sommet, on la sort aussi (avec son arité réelle)
                if let Some(Jeton::Fonction { def, .. }) = ops.last() {
                    let nb = cadre.nb_arguments();
                    if !def.arguments().accepte(nb) {
                        return Err(ErreurSyntaxe::NombreArgumentsInvalide {
                            nom: def.nom().to_string(),
                            attendus: def.arguments().to_string(),
                            recus: nb,
                        });
                    }
                    let def = def.clone();
                    ops.pop();
                    out.push(Jeton::fonction(def, nb));
                }

                attend_operande = false;
            }
        }
    }

    // vide la pile ops
    while let Some(op) = ops.pop() {
        if matches!(op, Jeton::Marqueur(_)) {
            return Err(ErreurSyntaxe::ParentheseNonAppariee);
        }
        out.push(op);
    }

    if out.is_empty() {
        // "()" : rien à évaluer
        return Err(ErreurSyntaxe::ExpressionVide);
    }

    Ok(out)
}

/// Dépile les opérateurs vers la sortie jusqu’à exposer une '(' (non retirée).
/// Retourne false si la pile se vide avant.
fn depiler_jusqu_a_ouvrante(ops: &mut Vec<Jeton>, out: &mut Vec<Jeton>) -> bool {
    loop {
        match ops.last() {
            None => return false,
            Some(Jeton::Marqueur(Marqueur::ParentheseOuvrante)) => return true,
            Some(_) => {
                if let Some(t) = ops.pop() {
                    out.push(t);
                }
            }
        }
    }
}
