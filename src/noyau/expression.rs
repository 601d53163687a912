// src/noyau/expression.rs
//
// Expression compilée :
// - programme postfixé immuable (partagé entre copies via Arc)
// - liaisons nom -> valeur, propres à chaque instance
//
// Contrats:
// - une variable ne peut pas porter le nom d’une fonction enregistrée (vérifié avant mutation)
// - validate() n’échoue jamais : il accumule les problèmes (sauf "too many operators",
//   qui arrête le comptage)
// - evaluate() / evaluate_exact() ne modifient pas le programme

use std::collections::{BTreeSet, HashMap, HashSet};
use std::f64::consts::{E, PI};
use std::sync::Arc;

use log::{debug, trace};

use super::erreurs::{ConflitDeNom, ErreurAnalyse, ErreurEvaluation, ErreurSyntaxe};
use super::eval::executer;
use super::format::format_jetons;
use super::jetons::{tokenize, Jeton, Options};
use super::nombre::Nombre;
use super::registre::{Arite, Registre};
use super::rpn::to_rpn;

/// Liaisons présentes dans toute nouvelle expression.
pub const VARIABLES_PAR_DEFAUT: [(&str, f64); 4] = [
    ("pi", PI),
    ("π", PI),
    ("φ", 1.61803398874),
    ("e", E),
];

/// Rapport de validation (jamais une erreur : une liste de messages).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validation {
    valide: bool,
    erreurs: Vec<String>,
}

impl Validation {
    pub const SUCCES: Validation = Validation {
        valide: true,
        erreurs: Vec::new(),
    };

    fn depuis(erreurs: Vec<String>) -> Self {
        if erreurs.is_empty() {
            Validation::SUCCES
        } else {
            Validation {
                valide: false,
                erreurs,
            }
        }
    }

    pub fn est_valide(&self) -> bool {
        self.valide
    }

    pub fn erreurs(&self) -> &[String] {
        &self.erreurs
    }
}

#[derive(Clone, Debug)]
pub struct Expression {
    programme: Arc<[Jeton]>,
    variables: HashMap<String, Nombre>,
    reserves: Arc<HashSet<String>>,
}

/// Analyse avec le registre global et les options par défaut.
pub fn parse(texte: &str) -> Result<Expression, ErreurAnalyse> {
    parse_avec(texte, Registre::global(), &Options::default())
}

/// texte -> jetons -> RPN -> Expression
pub fn parse_avec(
    texte: &str,
    registre: &Registre,
    options: &Options,
) -> Result<Expression, ErreurAnalyse> {
    if texte.trim().is_empty() {
        return Err(ErreurSyntaxe::ExpressionVide.into());
    }

    let jetons = tokenize(texte, registre, options)?;
    let programme = to_rpn(&jetons)?;

    debug!(
        "analyse {texte:?} : {} jetons, postfixe [{}]",
        jetons.len(),
        format_jetons(&programme)
    );

    Ok(Expression::depuis_postfixe(programme, registre))
}

impl Expression {
    /// Construit une expression à partir d’un programme postfixé déjà ordonné.
    pub fn depuis_postfixe(programme: Vec<Jeton>, registre: &Registre) -> Self {
        let variables = VARIABLES_PAR_DEFAUT
            .iter()
            .map(|(nom, v)| (nom.to_string(), Nombre::Reel(*v)))
            .collect();

        Expression {
            programme: programme.into(),
            variables,
            reserves: Arc::new(registre.noms_fonctions()),
        }
    }

    /// Le programme postfixé.
    pub fn jetons(&self) -> &[Jeton] {
        &self.programme
    }

    pub fn variables(&self) -> &HashMap<String, Nombre> {
        &self.variables
    }

    /// Noms de variables référencés par le programme (liés ou non).
    pub fn noms_variables(&self) -> BTreeSet<&str> {
        self.programme
            .iter()
            .filter_map(|j| match j {
                Jeton::Variable(nom) => Some(nom.as_str()),
                _ => None,
            })
            .collect()
    }

    fn verifier_nom(&self, nom: &str) -> Result<(), ConflitDeNom> {
        if self.reserves.contains(nom) {
            return Err(ConflitDeNom {
                nom: nom.to_string(),
            });
        }
        Ok(())
    }

    pub fn set_variable(&mut self, nom: &str, valeur: f64) -> Result<&mut Self, ConflitDeNom> {
        self.set_variable_exact(nom, Nombre::Reel(valeur))
    }

    /// Liaison sans perte de représentation (rationnel conservé tel quel).
    pub fn set_variable_exact(
        &mut self,
        nom: &str,
        valeur: impl Into<Nombre>,
    ) -> Result<&mut Self, ConflitDeNom> {
        self.verifier_nom(nom)?;
        let valeur = valeur.into();
        trace!("liaison {nom} = {valeur}");
        self.variables.insert(nom.to_string(), valeur);
        Ok(self)
    }

    /// Tout ou rien : si un nom est en conflit, aucune liaison n’est appliquée.
    pub fn set_variables<I, S, V>(&mut self, liaisons: I) -> Result<&mut Self, ConflitDeNom>
    where
        I: IntoIterator<Item = (S, V)>,
        S: Into<String>,
        V: Into<Nombre>,
    {
        let liaisons: Vec<(String, Nombre)> = liaisons
            .into_iter()
            .map(|(n, v)| (n.into(), v.into()))
            .collect();

        for (nom, _) in &liaisons {
            self.verifier_nom(nom)?;
        }
        for (nom, valeur) in liaisons {
            trace!("liaison {nom} = {valeur}");
            self.variables.insert(nom, valeur);
        }
        Ok(self)
    }

    /// Validation structurelle : variables liées (optionnel) + équilibre opérandes/opérateurs.
    pub fn validate(&self, verifier_variables: bool) -> Validation {
        let mut erreurs: Vec<String> = Vec::new();

        if verifier_variables {
            for jeton in self.programme.iter() {
                if let Jeton::Variable(nom) = jeton {
                    if !self.variables.contains_key(nom) {
                        erreurs.push(format!("the variable '{nom}' has not been set"));
                    }
                }
            }
        }

        // +1 par opérande, -1 par binaire, une fonction à n arguments rend n-1 valeurs.
        // Le compte doit rester >= 1 et finir à exactement 1.
        let mut count: isize = 0;
        for jeton in self.programme.iter() {
            match jeton {
                Jeton::Nombre(_) | Jeton::Variable(_) => count += 1,
                Jeton::Fonction { def, nb_args } => {
                    let n = match def.arguments_consommes(*nb_args) {
                        Some(n) => n as isize,
                        None => {
                            erreurs.push(format!("not enough arguments for '{}'", def.nom()));
                            *nb_args as isize
                        }
                    };
                    if n > count {
                        erreurs.push(format!("not enough arguments for '{}'", def.nom()));
                    }
                    if n > 1 {
                        count -= n - 1;
                    } else if n == 0 {
                        count += 1;
                    }
                }
                Jeton::Operateur(op) => {
                    if op.arite() == Arite::Binaire {
                        count -= 1;
                    }
                }
                Jeton::Marqueur(_) => erreurs.push("unexpected grouping marker".to_string()),
            }

            if count < 1 {
                erreurs.push("too many operators".to_string());
                trace!("validation : {erreurs:?}");
                return Validation::depuis(erreurs);
            }
        }

        if count > 1 {
            erreurs.push("too many operands".to_string());
        }

        trace!("validation : {erreurs:?}");
        Validation::depuis(erreurs)
    }

    /// Mode rapide : liaisons converties une fois en f64, puis calcul flottant pur.
    pub fn evaluate(&self) -> Result<f64, ErreurEvaluation> {
        let reels: HashMap<&str, f64> = self
            .variables
            .iter()
            .map(|(nom, v)| (nom.as_str(), v.to_f64()))
            .collect();
        executer(&self.programme, |nom| reels.get(nom).copied())
    }

    /// Mode exact : rationnels conservés tant que les règles le permettent.
    pub fn evaluate_exact(&self) -> Result<Nombre, ErreurEvaluation> {
        executer(&self.programme, |nom| self.variables.get(nom).cloned())
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod asynchrone {
    use std::future::Future;

    use tokio::runtime::Handle;

    use super::Expression;
    use crate::noyau::erreurs::ErreurEvaluation;
    use crate::noyau::nombre::Nombre;

    impl Expression {
        /// Soumet l’évaluation (sur une copie) au runtime fourni, immédiatement.
        /// Abandonner le futur n’interrompt pas un calcul déjà commencé.
        pub fn evaluate_async(
            &self,
            executeur: &Handle,
        ) -> impl Future<Output = Result<f64, ErreurEvaluation>> + Send + 'static {
            let copie = self.clone();
            let tache = executeur.spawn_blocking(move || copie.evaluate());
            async move {
                tache
                    .await
                    .map_err(|e| ErreurEvaluation::TacheInterrompue(e.to_string()))?
            }
        }

        pub fn evaluate_exact_async(
            &self,
            executeur: &Handle,
        ) -> impl Future<Output = Result<Nombre, ErreurEvaluation>> + Send + 'static {
            let copie = self.clone();
            let tache = executeur.spawn_blocking(move || copie.evaluate_exact());
            async move {
                tache
                    .await
                    .map_err(|e| ErreurEvaluation::TacheInterrompue(e.to_string()))?
            }
        }
    }
}
