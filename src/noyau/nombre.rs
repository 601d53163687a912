// src/noyau/nombre.rs
//
// Abstraction numérique du mode exact.
// - Rationnel : valeur exacte (BigRational)
// - Reel      : valeur flottante (dès qu’une règle sort du domaine rationnel)
//
// IMPORTANT:
// - Une règle exacte ne doit jamais “inventer” un rationnel pour un résultat irrationnel.
// - to_f64 est l’unique conversion vers le mode rapide.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use std::fmt;

/// Au-delà, on renonce à la valeur exacte d’un littéral (10^n devient trop coûteux).
const EXPOSANT_EXACT_MAX: i64 = 4096;

/// Taille maximale (en bits) d’une puissance calculée exactement.
const BITS_PUISSANCE_MAX: u64 = 1 << 16;

#[derive(Clone, Debug)]
pub enum Nombre {
    Rationnel(BigRational),
    Reel(f64),
}

impl Nombre {
    pub fn est_exact(&self) -> bool {
        matches!(self, Nombre::Rationnel(_))
    }

    pub fn to_f64(&self) -> f64 {
        to_f64(self)
    }

    pub fn rationnel(&self) -> Option<&BigRational> {
        match self {
            Nombre::Rationnel(r) => Some(r),
            Nombre::Reel(_) => None,
        }
    }
}

/// Coercition vers le flottant 64 bits.
pub fn to_f64(n: &Nombre) -> f64 {
    match n {
        Nombre::Reel(x) => *x,
        Nombre::Rationnel(r) => r.to_f64().unwrap_or_else(|| {
            // garde-fou : num/den séparés (perte de précision acceptée)
            let num = r.numer().to_f64().unwrap_or(f64::NAN);
            let den = r.denom().to_f64().unwrap_or(f64::NAN);
            num / den
        }),
    }
}

impl From<f64> for Nombre {
    fn from(x: f64) -> Self {
        Nombre::Reel(x)
    }
}

impl From<i64> for Nombre {
    fn from(n: i64) -> Self {
        Nombre::Rationnel(BigRational::from_integer(BigInt::from(n)))
    }
}

impl From<BigRational> for Nombre {
    fn from(r: BigRational) -> Self {
        Nombre::Rationnel(r)
    }
}

impl PartialEq for Nombre {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Nombre::Rationnel(a), Nombre::Rationnel(b)) => a == b,
            _ => to_f64(self) == to_f64(other),
        }
    }
}

impl fmt::Display for Nombre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Nombre::Rationnel(r) if r.denom().is_one() => write!(f, "{}", r.numer()),
            Nombre::Rationnel(r) => write!(f, "{}/{}", r.numer(), r.denom()),
            Nombre::Reel(x) => write!(f, "{x}"),
        }
    }
}

/* ------------------------ Littéraux ------------------------ */

/// Littéral numérique lu une seule fois sous ses deux formes.
#[derive(Clone, Debug)]
pub struct Litteral {
    reel: f64,
    exact: Option<BigRational>,
}

impl Litteral {
    /// Lit un littéral déjà validé par le tokenizer :
    /// chiffres, point optionnel, chiffres, exposant optionnel (e/E, signe optionnel).
    /// Retourne None si la forme n’est pas celle attendue.
    pub fn depuis_texte(texte: &str) -> Option<Litteral> {
        let (mantisse, exposant) = match texte.find(['e', 'E']) {
            Some(i) => (&texte[..i], Some(&texte[i + 1..])),
            None => (texte, None),
        };

        let (entiere, fraction) = match mantisse.split_once('.') {
            Some((a, b)) => (a, b),
            None => (mantisse, ""),
        };
        if entiere.is_empty() && fraction.is_empty() {
            return None;
        }
        if !entiere.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return None;
        }

        let exposant_txt = match exposant {
            Some(e) => {
                let chiffres = e.strip_prefix(['+', '-']).unwrap_or(e);
                if chiffres.is_empty() || !chiffres.chars().all(|c| c.is_ascii_digit()) {
                    return None;
                }
                e
            }
            None => "0",
        };

        // forme normalisée pour le flottant (accepte "1." et ".5")
        let normalise = format!(
            "{}.{}e{}",
            if entiere.is_empty() { "0" } else { entiere },
            if fraction.is_empty() { "0" } else { fraction },
            exposant_txt
        );
        let reel = normalise.parse::<f64>().ok()?;

        let exact = exposant_txt
            .parse::<i64>()
            .ok()
            .filter(|e| e.abs() <= EXPOSANT_EXACT_MAX)
            .and_then(|e| rationnel_decimal(entiere, fraction, e));

        Some(Litteral { reel, exact })
    }

    pub fn reel(&self) -> f64 {
        self.reel
    }

    pub fn exact(&self) -> Option<&BigRational> {
        self.exact.as_ref()
    }

    pub fn nombre(&self) -> Nombre {
        match &self.exact {
            Some(r) => Nombre::Rationnel(r.clone()),
            None => Nombre::Reel(self.reel),
        }
    }
}

impl From<f64> for Litteral {
    fn from(x: f64) -> Self {
        Litteral {
            reel: x,
            exact: BigRational::from_float(x),
        }
    }
}

impl PartialEq for Litteral {
    fn eq(&self, other: &Self) -> bool {
        match (&self.exact, &other.exact) {
            (Some(a), Some(b)) => a == b,
            _ => self.reel == other.reel,
        }
    }
}

impl fmt::Display for Litteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.exact {
            Some(r) if r.denom().is_one() => write!(f, "{}", r.numer()),
            _ => write!(f, "{}", self.reel),
        }
    }
}

/// "12.5" e3 -> 125 * 10^(3-1)
fn rationnel_decimal(entiere: &str, fraction: &str, exposant: i64) -> Option<BigRational> {
    let chiffres = format!("{entiere}{fraction}");
    let mantisse = BigInt::parse_bytes(chiffres.as_bytes(), 10)?;
    let echelle = exposant - fraction.len() as i64;

    let dix = BigInt::from(10);
    let r = if echelle >= 0 {
        BigRational::from_integer(mantisse * dix.pow(u32::try_from(echelle).ok()?))
    } else {
        BigRational::new(mantisse, dix.pow(u32::try_from(-echelle).ok()?))
    };
    Some(r)
}

/* ------------------------ Arithmétique exacte ------------------------ */
//
// Chaque opération tente le domaine rationnel ; sinon repli flottant.

fn binaire(
    a: &Nombre,
    b: &Nombre,
    exact: impl Fn(&BigRational, &BigRational) -> Option<BigRational>,
    reel: impl Fn(f64, f64) -> f64,
) -> Nombre {
    if let (Nombre::Rationnel(x), Nombre::Rationnel(y)) = (a, b) {
        if let Some(r) = exact(x, y) {
            return Nombre::Rationnel(r);
        }
    }
    Nombre::Reel(reel(to_f64(a), to_f64(b)))
}

fn unaire(
    a: &Nombre,
    exact: impl Fn(&BigRational) -> BigRational,
    reel: impl Fn(f64) -> f64,
) -> Nombre {
    match a {
        Nombre::Rationnel(x) => Nombre::Rationnel(exact(x)),
        Nombre::Reel(x) => Nombre::Reel(reel(*x)),
    }
}

pub fn additionner(a: &Nombre, b: &Nombre) -> Nombre {
    binaire(a, b, |x, y| Some(x + y), |x, y| x + y)
}

pub fn soustraire(a: &Nombre, b: &Nombre) -> Nombre {
    binaire(a, b, |x, y| Some(x - y), |x, y| x - y)
}

pub fn multiplier(a: &Nombre, b: &Nombre) -> Nombre {
    binaire(a, b, |x, y| Some(x * y), |x, y| x * y)
}

/// Division par zéro : repli IEEE (±inf / NaN).
pub fn diviser(a: &Nombre, b: &Nombre) -> Nombre {
    binaire(
        a,
        b,
        |x, y| (!y.is_zero()).then(|| x / y),
        |x, y| x / y,
    )
}

pub fn modulo(a: &Nombre, b: &Nombre) -> Nombre {
    binaire(
        a,
        b,
        |x, y| (!y.is_zero()).then(|| x % y),
        |x, y| x % y,
    )
}

/// Exposant entier (i32) => exact ; sinon flottant.
/// Un résultat de plus de BITS_PUISSANCE_MAX bits repasse aussi en flottant.
pub fn puissance(a: &Nombre, b: &Nombre) -> Nombre {
    binaire(
        a,
        b,
        |x, y| {
            if !y.is_integer() {
                return None;
            }
            let n = y.to_integer().to_i32()?;
            if x.is_zero() && n < 0 {
                return None;
            }
            let bits = x.numer().bits().max(x.denom().bits());
            if bits.saturating_mul(u64::from(n.unsigned_abs())) > BITS_PUISSANCE_MAX {
                return None;
            }
            Some(num_traits::Pow::pow(x, n))
        },
        f64::powf,
    )
}

pub fn opposer(a: &Nombre) -> Nombre {
    unaire(a, |x| -x, |x| -x)
}

pub fn absolu(a: &Nombre) -> Nombre {
    unaire(a, |x| x.abs(), f64::abs)
}

pub fn plancher(a: &Nombre) -> Nombre {
    unaire(a, |x| x.floor(), f64::floor)
}

pub fn plafond(a: &Nombre) -> Nombre {
    unaire(a, |x| x.ceil(), f64::ceil)
}

pub fn signe(a: &Nombre) -> Nombre {
    unaire(
        a,
        |x| x.signum(),
        |x| if x == 0.0 || x.is_nan() { x } else { x.signum() },
    )
}

/// min/max variadiques : exact si tous les arguments sont rationnels.
pub fn extremum(args: &[Nombre], garder_plus_grand: bool) -> Nombre {
    let rationnels: Option<Vec<&BigRational>> = args.iter().map(Nombre::rationnel).collect();
    if let Some(rs) = rationnels {
        let choisi = if garder_plus_grand {
            rs.into_iter().max()
        } else {
            rs.into_iter().min()
        };
        if let Some(r) = choisi {
            return Nombre::Rationnel(r.clone());
        }
    }
    let reels = args.iter().map(to_f64);
    let r = if garder_plus_grand {
        reels.fold(f64::NEG_INFINITY, f64::max)
    } else {
        reels.fold(f64::INFINITY, f64::min)
    };
    Nombre::Reel(r)
}
