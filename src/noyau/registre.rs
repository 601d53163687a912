// src/noyau/registre.rs
//
// Registre des opérateurs et fonctions (lecture seule une fois construit).
// - Registre::standard() : jeu intégré
// - avec_operateur / avec_fonction : surcharges utilisateur (remplacent l’entrée existante)
// - Registre::global() : instance partagée, initialisée une seule fois (OnceLock)
//
// Le tokenizer et le convertisseur reçoivent le registre par référence.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, OnceLock};

use super::erreurs::ErreurRegistre;
use super::nombre::{self, Nombre};

/// Règle flottante : arguments dans l’ordre déclaré (indice 0 = le plus ancien).
pub type Regle = Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// Règle exacte (optionnelle) : à défaut, repli sur la règle flottante.
pub type RegleExacte = Arc<dyn Fn(&[Nombre]) -> Nombre + Send + Sync>;

pub const PRECEDENCE_ADDITION: i32 = 500;
pub const PRECEDENCE_MULTIPLICATION: i32 = 1000;
pub const PRECEDENCE_PUISSANCE: i32 = 10000;
/// Au-dessus de tous les opérateurs binaires.
pub const PRECEDENCE_UNAIRE: i32 = 20000;

/// Caractères autorisés dans un symbole d’opérateur.
pub const CARACTERES_OPERATEUR: &[char] = &[
    '+', '-', '*', '/', '^', '%', '!', '#', '§', '$', '&', ';', ':', '~', '<', '>', '|', '=',
    '¬', '≠', '≤', '≥', '±',
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Associativite {
    Gauche,
    Droite,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Arite {
    Unaire,
    Binaire,
}

impl Arite {
    pub fn nb_operandes(self) -> usize {
        match self {
            Arite::Unaire => 1,
            Arite::Binaire => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NbArguments {
    Fixe(usize),
    Variable { min: usize },
}

impl NbArguments {
    pub fn accepte(self, n: usize) -> bool {
        match self {
            NbArguments::Fixe(k) => n == k,
            NbArguments::Variable { min } => n >= min,
        }
    }
}

impl fmt::Display for NbArguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NbArguments::Fixe(k) => write!(f, "{k}"),
            NbArguments::Variable { min } => write!(f, "at least {min}"),
        }
    }
}

/* ------------------------ Opérateur ------------------------ */

#[derive(Clone)]
pub struct Operateur {
    symbole: String,
    precedence: i32,
    associativite: Associativite,
    arite: Arite,
    regle: Regle,
    regle_exacte: Option<RegleExacte>,
}

impl Operateur {
    pub fn new(
        symbole: impl Into<String>,
        arite: Arite,
        precedence: i32,
        associativite: Associativite,
        regle: impl Fn(&[f64]) -> f64 + Send + Sync + 'static,
    ) -> Result<Self, ErreurRegistre> {
        let symbole = symbole.into();
        if symbole.is_empty() || !symbole.chars().all(|c| CARACTERES_OPERATEUR.contains(&c)) {
            return Err(ErreurRegistre::SymboleInvalide(symbole));
        }
        Ok(Operateur {
            symbole,
            precedence,
            associativite,
            arite,
            regle: Arc::new(regle),
            regle_exacte: None,
        })
    }

    /// Ajoute une règle qui préserve la représentation exacte.
    pub fn avec_regle_exacte(
        mut self,
        regle: impl Fn(&[Nombre]) -> Nombre + Send + Sync + 'static,
    ) -> Self {
        self.regle_exacte = Some(Arc::new(regle));
        self
    }

    pub fn symbole(&self) -> &str {
        &self.symbole
    }

    pub fn precedence(&self) -> i32 {
        self.precedence
    }

    pub fn associativite(&self) -> Associativite {
        self.associativite
    }

    pub fn arite(&self) -> Arite {
        self.arite
    }

    pub fn appliquer(&self, args: &[f64]) -> f64 {
        (self.regle)(args)
    }

    pub fn appliquer_exact(&self, args: &[Nombre]) -> Nombre {
        match &self.regle_exacte {
            Some(r) => r(args),
            None => Nombre::Reel(appliquer_reel(&self.regle, args)),
        }
    }
}

impl fmt::Debug for Operateur {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operateur")
            .field("symbole", &self.symbole)
            .field("precedence", &self.precedence)
            .field("associativite", &self.associativite)
            .field("arite", &self.arite)
            .finish_non_exhaustive()
    }
}

/* ------------------------ Fonction ------------------------ */

#[derive(Clone)]
pub struct Fonction {
    nom: String,
    arguments: NbArguments,
    regle: Regle,
    regle_exacte: Option<RegleExacte>,
}

impl Fonction {
    pub fn new(
        nom: impl Into<String>,
        arguments: NbArguments,
        regle: impl Fn(&[f64]) -> f64 + Send + Sync + 'static,
    ) -> Result<Self, ErreurRegistre> {
        let nom = nom.into();
        if !est_identifiant(&nom) {
            return Err(ErreurRegistre::NomFonctionInvalide(nom));
        }
        Ok(Fonction {
            nom,
            arguments,
            regle: Arc::new(regle),
            regle_exacte: None,
        })
    }

    pub fn avec_regle_exacte(
        mut self,
        regle: impl Fn(&[Nombre]) -> Nombre + Send + Sync + 'static,
    ) -> Self {
        self.regle_exacte = Some(Arc::new(regle));
        self
    }

    pub fn nom(&self) -> &str {
        &self.nom
    }

    pub fn arguments(&self) -> NbArguments {
        self.arguments
    }

    /// Nombre de valeurs consommées pour un appel annoté `nb_args`.
    ///
    /// L’arité fixe de la définition l’emporte sur l’annotation du jeton ;
    /// None si un appel variadique n’atteint pas le minimum.
    pub fn arguments_consommes(&self, nb_args: usize) -> Option<usize> {
        match self.arguments {
            NbArguments::Fixe(k) => Some(k),
            NbArguments::Variable { min } => (nb_args >= min).then_some(nb_args),
        }
    }

    pub fn appliquer(&self, args: &[f64]) -> f64 {
        (self.regle)(args)
    }

    pub fn appliquer_exact(&self, args: &[Nombre]) -> Nombre {
        match &self.regle_exacte {
            Some(r) => r(args),
            None => Nombre::Reel(appliquer_reel(&self.regle, args)),
        }
    }
}

impl fmt::Debug for Fonction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fonction")
            .field("nom", &self.nom)
            .field("arguments", &self.arguments)
            .finish_non_exhaustive()
    }
}

fn appliquer_reel(regle: &Regle, args: &[Nombre]) -> f64 {
    let reels: Vec<f64> = args.iter().map(nombre::to_f64).collect();
    regle(&reels)
}

/// [lettre|_][lettre|chiffre|_]* (lettres Unicode acceptées)
pub fn est_identifiant(nom: &str) -> bool {
    let mut it = nom.chars();
    match it.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    it.all(|c| c.is_alphanumeric() || c == '_')
}

/* ------------------------ Registre ------------------------ */

#[derive(Clone, Debug, Default)]
pub struct Registre {
    operateurs: HashMap<(String, Arite), Arc<Operateur>>,
    fonctions: HashMap<String, Arc<Fonction>>,
    longueur_symbole_max: usize,
}

static REGISTRE_GLOBAL: OnceLock<Registre> = OnceLock::new();

impl Registre {
    /// Registre vide (aucun opérateur, aucune fonction).
    pub fn vide() -> Self {
        Self::default()
    }

    /// Jeu intégré : + - * / % ^, +/- unaires, fonctions usuelles.
    pub fn standard() -> Self {
        let mut r = Registre::vide();
        for op in operateurs_integres() {
            r.inserer_operateur(op);
        }
        for f in fonctions_integrees() {
            r.inserer_fonction(f);
        }
        r
    }

    /// Instance partagée du jeu intégré (jamais modifiée après initialisation).
    pub fn global() -> &'static Registre {
        REGISTRE_GLOBAL.get_or_init(Registre::standard)
    }

    pub fn avec_operateur(mut self, op: Operateur) -> Self {
        self.inserer_operateur(op);
        self
    }

    pub fn avec_fonction(mut self, f: Fonction) -> Self {
        self.inserer_fonction(f);
        self
    }

    fn inserer_operateur(&mut self, op: Operateur) {
        self.longueur_symbole_max = self.longueur_symbole_max.max(op.symbole.chars().count());
        self.operateurs
            .insert((op.symbole.clone(), op.arite), Arc::new(op));
    }

    fn inserer_fonction(&mut self, f: Fonction) {
        self.fonctions.insert(f.nom.clone(), Arc::new(f));
    }

    pub fn operateur(&self, symbole: &str, arite: Arite) -> Option<&Arc<Operateur>> {
        self.operateurs.get(&(symbole.to_string(), arite))
    }

    /// Vrai si au moins une arité est enregistrée pour ce symbole.
    pub fn est_symbole(&self, symbole: &str) -> bool {
        self.operateur(symbole, Arite::Binaire).is_some()
            || self.operateur(symbole, Arite::Unaire).is_some()
    }

    pub fn longueur_symbole_max(&self) -> usize {
        self.longueur_symbole_max
    }

    pub fn fonction(&self, nom: &str) -> Option<&Arc<Fonction>> {
        self.fonctions.get(nom)
    }

    /// Nom réservé = nom de fonction enregistrée (interdit comme variable).
    pub fn est_reserve(&self, nom: &str) -> bool {
        self.fonctions.contains_key(nom)
    }

    pub fn noms_fonctions(&self) -> HashSet<String> {
        self.fonctions.keys().cloned().collect()
    }
}

/* ------------------------ Jeu intégré ------------------------ */

fn op_integre(
    symbole: &str,
    arite: Arite,
    precedence: i32,
    associativite: Associativite,
    regle: fn(&[f64]) -> f64,
    regle_exacte: fn(&[Nombre]) -> Nombre,
) -> Operateur {
    Operateur {
        symbole: symbole.to_string(),
        precedence,
        associativite,
        arite,
        regle: Arc::new(regle),
        regle_exacte: Some(Arc::new(regle_exacte)),
    }
}

fn operateurs_integres() -> Vec<Operateur> {
    use Arite::*;
    use Associativite::*;

    vec![
        op_integre("+", Binaire, PRECEDENCE_ADDITION, Gauche, |a| a[0] + a[1], |a| {
            nombre::additionner(&a[0], &a[1])
        }),
        op_integre("-", Binaire, PRECEDENCE_ADDITION, Gauche, |a| a[0] - a[1], |a| {
            nombre::soustraire(&a[0], &a[1])
        }),
        op_integre("*", Binaire, PRECEDENCE_MULTIPLICATION, Gauche, |a| a[0] * a[1], |a| {
            nombre::multiplier(&a[0], &a[1])
        }),
        op_integre("/", Binaire, PRECEDENCE_MULTIPLICATION, Gauche, |a| a[0] / a[1], |a| {
            nombre::diviser(&a[0], &a[1])
        }),
        op_integre("%", Binaire, PRECEDENCE_MULTIPLICATION, Gauche, |a| a[0] % a[1], |a| {
            nombre::modulo(&a[0], &a[1])
        }),
        op_integre("^", Binaire, PRECEDENCE_PUISSANCE, Droite, |a| a[0].powf(a[1]), |a| {
            nombre::puissance(&a[0], &a[1])
        }),
        // unaires préfixes : associatifs à droite (« - -3 »)
        op_integre("-", Unaire, PRECEDENCE_UNAIRE, Droite, |a| -a[0], |a| {
            nombre::opposer(&a[0])
        }),
        op_integre("+", Unaire, PRECEDENCE_UNAIRE, Droite, |a| a[0], |a| a[0].clone()),
    ]
}

fn f1(nom: &str, regle: fn(f64) -> f64) -> Fonction {
    Fonction {
        nom: nom.to_string(),
        arguments: NbArguments::Fixe(1),
        regle: Arc::new(move |a: &[f64]| regle(a[0])),
        regle_exacte: None,
    }
}

fn f1_exacte(nom: &str, regle: fn(f64) -> f64, exacte: fn(&Nombre) -> Nombre) -> Fonction {
    let mut f = f1(nom, regle);
    f.regle_exacte = Some(Arc::new(move |a: &[Nombre]| exacte(&a[0])));
    f
}

fn fonctions_integrees() -> Vec<Fonction> {
    let mut v = vec![
        f1("sin", f64::sin),
        f1("cos", f64::cos),
        f1("tan", f64::tan),
        f1("cot", |x| 1.0 / x.tan()),
        f1("sec", |x| 1.0 / x.cos()),
        f1("csc", |x| 1.0 / x.sin()),
        f1("asin", f64::asin),
        f1("acos", f64::acos),
        f1("atan", f64::atan),
        f1("sinh", f64::sinh),
        f1("cosh", f64::cosh),
        f1("tanh", f64::tanh),
        f1("coth", |x| 1.0 / x.tanh()),
        f1("sech", |x| 1.0 / x.cosh()),
        f1("csch", |x| 1.0 / x.sinh()),
        f1("log", f64::ln),
        f1("log2", f64::log2),
        f1("log10", f64::log10),
        f1("log1p", f64::ln_1p),
        f1("exp", f64::exp),
        f1("expm1", f64::exp_m1),
        f1("sqrt", f64::sqrt),
        f1("cbrt", f64::cbrt),
        f1("toradian", f64::to_radians),
        f1("todegree", f64::to_degrees),
        f1_exacte("abs", f64::abs, nombre::absolu),
        f1_exacte("ceil", f64::ceil, nombre::plafond),
        f1_exacte("floor", f64::floor, nombre::plancher),
        f1_exacte(
            "signum",
            |x| if x == 0.0 || x.is_nan() { x } else { x.signum() },
            nombre::signe,
        ),
    ];

    v.push(Fonction {
        nom: "pow".to_string(),
        arguments: NbArguments::Fixe(2),
        regle: Arc::new(|a: &[f64]| a[0].powf(a[1])),
        regle_exacte: Some(Arc::new(|a: &[Nombre]| nombre::puissance(&a[0], &a[1]))),
    });
    v.push(Fonction {
        nom: "atan2".to_string(),
        arguments: NbArguments::Fixe(2),
        regle: Arc::new(|a: &[f64]| a[0].atan2(a[1])),
        regle_exacte: None,
    });
    v.push(Fonction {
        nom: "max".to_string(),
        arguments: NbArguments::Variable { min: 1 },
        regle: Arc::new(|a: &[f64]| a.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
        regle_exacte: Some(Arc::new(|a: &[Nombre]| nombre::extremum(a, true))),
    });
    v.push(Fonction {
        nom: "min".to_string(),
        arguments: NbArguments::Variable { min: 1 },
        regle: Arc::new(|a: &[f64]| a.iter().copied().fold(f64::INFINITY, f64::min)),
        regle_exacte: Some(Arc::new(|a: &[Nombre]| nombre::extremum(a, false))),
    });

    v
}
