// src/noyau/jetons.rs

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::erreurs::ErreurLexicale;
use super::expression::VARIABLES_PAR_DEFAUT;
use super::nombre::Litteral;
use super::registre::{est_identifiant, Arite, Fonction, NbArguments, Operateur, Registre};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marqueur {
    ParentheseOuvrante,
    ParentheseFermante,
    Separateur,
}

/// Unité lexicale. Les marqueurs n’existent que pendant la conversion :
/// ils n’apparaissent jamais dans un programme postfixé.
#[derive(Clone, Debug)]
pub enum Jeton {
    Nombre(Litteral),
    Variable(String),
    Operateur(Arc<Operateur>),
    // nb_args : arité fixe à la lecture, nombre réel d’arguments après conversion
    Fonction { def: Arc<Fonction>, nb_args: usize },
    Marqueur(Marqueur),
}

impl Jeton {
    pub fn fonction(def: Arc<Fonction>, nb_args: usize) -> Self {
        Jeton::Fonction { def, nb_args }
    }
}

impl PartialEq for Jeton {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Jeton::Nombre(a), Jeton::Nombre(b)) => a == b,
            (Jeton::Variable(a), Jeton::Variable(b)) => a == b,
            (Jeton::Operateur(a), Jeton::Operateur(b)) => {
                a.symbole() == b.symbole() && a.arite() == b.arite()
            }
            (
                Jeton::Fonction { def: a, nb_args: n },
                Jeton::Fonction { def: b, nb_args: m },
            ) => a.nom() == b.nom() && n == m,
            (Jeton::Marqueur(a), Jeton::Marqueur(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Jeton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Jeton::Nombre(l) => write!(f, "{l}"),
            Jeton::Variable(nom) => write!(f, "{nom}"),
            Jeton::Operateur(op) => match op.arite() {
                Arite::Binaire => write!(f, "{}", op.symbole()),
                Arite::Unaire => write!(f, "{}u", op.symbole()),
            },
            Jeton::Fonction { def, nb_args } => write!(f, "{}/{}", def.nom(), nb_args),
            Jeton::Marqueur(Marqueur::ParentheseOuvrante) => write!(f, "("),
            Jeton::Marqueur(Marqueur::ParentheseFermante) => write!(f, ")"),
            Jeton::Marqueur(Marqueur::Separateur) => write!(f, ","),
        }
    }
}

/// Options de lecture.
#[derive(Clone, Debug)]
pub struct Options {
    /// Some(noms) : seuls ces noms (et les constantes par défaut) sont des variables.
    pub variables: Option<HashSet<String>>,
    /// "2x", "2(3+1)", "(1)(2)" => multiplication insérée.
    ///
    /// Un 'e' ou 'E' collé à un nombre ouvre toujours un exposant : "2e" et "2exp(1)"
    /// sont des nombres mal formés, "2 e" et "2 exp(1)" des produits.
    pub multiplication_implicite: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            variables: None,
            multiplication_implicite: true,
        }
    }
}

impl Options {
    pub fn avec_variables<I, S>(mut self, noms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variables = Some(noms.into_iter().map(Into::into).collect());
        self
    }

    pub fn sans_multiplication_implicite(mut self) -> Self {
        self.multiplication_implicite = false;
        self
    }

    fn variable_connue(&self, nom: &str) -> bool {
        match &self.variables {
            None => true,
            Some(noms) => {
                noms.contains(nom) || VARIABLES_PAR_DEFAUT.iter().any(|(n, _)| *n == nom)
            }
        }
    }
}

/// État de lecture : la suite de jetons + “attend-on une opérande ?”.
/// attend_operande vaut vrai au début, après un opérateur (binaire ou unaire préfixe),
/// après '(' et après ','. Un opérateur lu dans cette position est unaire.
struct Sortie<'a> {
    jetons: Vec<Jeton>,
    attend_operande: bool,
    registre: &'a Registre,
    options: &'a Options,
}

impl Sortie<'_> {
    fn debute_valeur(jeton: &Jeton) -> bool {
        matches!(
            jeton,
            Jeton::Nombre(_)
                | Jeton::Variable(_)
                | Jeton::Fonction { .. }
                | Jeton::Marqueur(Marqueur::ParentheseOuvrante)
        )
    }

    fn pousser(&mut self, jeton: Jeton) {
        if self.options.multiplication_implicite
            && !self.attend_operande
            && !self.jetons.is_empty()
            && Self::debute_valeur(&jeton)
        {
            if let Some(fois) = self.registre.operateur("*", Arite::Binaire) {
                self.jetons.push(Jeton::Operateur(fois.clone()));
            }
        }

        self.attend_operande = match &jeton {
            Jeton::Nombre(_) | Jeton::Variable(_) => false,
            Jeton::Fonction { .. } => true,
            Jeton::Marqueur(Marqueur::ParentheseFermante) => false,
            Jeton::Marqueur(_) => true,
            Jeton::Operateur(op) => match op.arite() {
                Arite::Binaire => true,
                // unaire préfixe : on attend toujours son opérande ; postfixe : valeur close
                Arite::Unaire => self.attend_operande,
            },
        };
        self.jetons.push(jeton);
    }
}

/// Tokenize une chaîne en jetons.
/// Supporte:
/// - nombres décimaux (ex: 12, 0.5, .5, 1e-3, 2.5E+4)
/// - identifiants Unicode : fonction si suivie de '(' et enregistrée, sinon variable
/// - symboles d’opérateurs du registre (plus long d’abord), unaires selon la position
/// - parenthèses et virgule
pub fn tokenize(
    texte: &str,
    registre: &Registre,
    options: &Options,
) -> Result<Vec<Jeton>, ErreurLexicale> {
    let chars: Vec<char> = texte.chars().collect();
    let mut sortie = Sortie {
        jetons: Vec::new(),
        attend_operande: true,
        registre,
        options,
    };
    let mut i: usize = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        // Parenthèses + séparateur
        let marqueur = match c {
            '(' => Some(Marqueur::ParentheseOuvrante),
            ')' => Some(Marqueur::ParentheseFermante),
            ',' => Some(Marqueur::Separateur),
            _ => None,
        };
        if let Some(m) = marqueur {
            sortie.pousser(Jeton::Marqueur(m));
            i += 1;
            continue;
        }

        // Nombre : chiffre, ou '.' suivi d’un chiffre
        if c.is_ascii_digit()
            || (c == '.' && chars.get(i + 1).is_some_and(|d| d.is_ascii_digit()))
        {
            let (litteral, fin) = lire_nombre(&chars, i)?;
            sortie.pousser(Jeton::Nombre(litteral));
            i = fin;
            continue;
        }

        // Identifiant : fonction ou variable
        if c.is_alphabetic() || c == '_' {
            let debut = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let nom: String = chars[debut..i].iter().collect();
            lire_identifiant(&mut sortie, &chars, nom, debut, i)?;
            continue;
        }

        // Opérateur : correspondance la plus longue d’abord
        if let Some((op, fin)) = lire_operateur(&sortie, &chars, i)? {
            sortie.pousser(Jeton::Operateur(op));
            i = fin;
            continue;
        }

        return Err(ErreurLexicale::CaractereInattendu {
            caractere: c,
            position: i,
        });
    }

    Ok(sortie.jetons)
}

/// Grammaire : chiffres [. chiffres] [(e|E) [+|-] chiffres]
/// Deux points décimaux ou un exposant sans chiffres => erreur.
fn lire_nombre(chars: &[char], debut: usize) -> Result<(Litteral, usize), ErreurLexicale> {
    let mut i = debut;
    let mut point = false;

    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_digit() {
            i += 1;
        } else if c == '.' && !point {
            point = true;
            i += 1;
        } else {
            break;
        }
    }

    let mal_forme = |fin: usize| ErreurLexicale::NombreMalForme {
        texte: chars[debut..fin.min(chars.len())].iter().collect(),
        position: debut,
    };

    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        i += 1;
        if i < chars.len() && (chars[i] == '+' || chars[i] == '-') {
            i += 1;
        }
        let debut_exposant = i;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        if i == debut_exposant {
            return Err(mal_forme(i + 1));
        }
    }

    // "1.2.3" ou "1e5.2"
    if i < chars.len() && chars[i] == '.' {
        let mut fin = i + 1;
        while fin < chars.len() && (chars[fin].is_ascii_digit() || chars[fin] == '.') {
            fin += 1;
        }
        return Err(mal_forme(fin));
    }

    let texte: String = chars[debut..i].iter().collect();
    let litteral = Litteral::depuis_texte(&texte).ok_or_else(|| mal_forme(i))?;
    Ok((litteral, i))
}

fn lire_identifiant(
    sortie: &mut Sortie<'_>,
    chars: &[char],
    nom: String,
    debut: usize,
    fin: usize,
) -> Result<(), ErreurLexicale> {
    if let Some(def) = sortie.registre.fonction(&nom) {
        // "sin (x)" accepté : on saute les espaces avant '('
        let suivant = chars[fin..].iter().find(|c| !c.is_whitespace());
        if suivant != Some(&'(') {
            return Err(ErreurLexicale::FonctionSansParenthese {
                nom,
                position: debut,
            });
        }
        let nb_args = match def.arguments() {
            NbArguments::Fixe(n) => n,
            NbArguments::Variable { .. } => 0,
        };
        sortie.pousser(Jeton::fonction(def.clone(), nb_args));
        return Ok(());
    }

    let options = sortie.options;
    if options.variable_connue(&nom) {
        sortie.pousser(Jeton::Variable(nom));
        return Ok(());
    }

    // "xy" avec x et y connus => x*y (découpage glouton, plus long préfixe d’abord)
    if options.multiplication_implicite {
        if let Some(morceaux) = decouper(&nom, |n| options.variable_connue(n)) {
            for m in morceaux {
                sortie.pousser(Jeton::Variable(m));
            }
            return Ok(());
        }
    }

    Err(ErreurLexicale::IdentifiantInconnu {
        nom,
        position: debut,
    })
}

fn decouper(nom: &str, connu: impl Fn(&str) -> bool) -> Option<Vec<String>> {
    let chars: Vec<char> = nom.chars().collect();
    let mut morceaux = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let trouve = (i + 1..=chars.len()).rev().find(|&fin| {
            let candidat: String = chars[i..fin].iter().collect();
            est_identifiant(&candidat) && connu(&candidat)
        })?;
        morceaux.push(chars[i..trouve].iter().collect());
        i = trouve;
    }

    Some(morceaux)
}

fn lire_operateur(
    sortie: &Sortie<'_>,
    chars: &[char],
    debut: usize,
) -> Result<Option<(Arc<Operateur>, usize)>, ErreurLexicale> {
    let registre = sortie.registre;
    let max = registre.longueur_symbole_max().min(chars.len() - debut);

    let symbole = (1..=max)
        .rev()
        .map(|n| chars[debut..debut + n].iter().collect::<String>())
        .find(|s| registre.est_symbole(s));

    let Some(symbole) = symbole else {
        return Ok(None);
    };

    let op = if sortie.attend_operande {
        registre.operateur(&symbole, Arite::Unaire)
    } else {
        // binaire d’abord, sinon unaire postfixe (ex: "3!")
        registre
            .operateur(&symbole, Arite::Binaire)
            .or_else(|| registre.operateur(&symbole, Arite::Unaire))
    };

    match op {
        Some(op) => {
            let fin = debut + symbole.chars().count();
            Ok(Some((op.clone(), fin)))
        }
        None => Err(ErreurLexicale::OperateurInconnu {
            symbole,
            position: debut,
        }),
    }
}
