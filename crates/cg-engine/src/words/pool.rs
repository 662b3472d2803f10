//! Pre-authored word pools for the tiers that never call the generator.

use std::collections::HashMap;

use rand::Rng;
use rand::seq::IndexedRandom;

use cg_content::ChallengeItem;
use cg_content::schema::normalize_word;
use cg_core::WordTier;

/// Static items per tier.
///
/// The hard tier is empty by default: hard words come from the generator,
/// and a hard draw with no generated item fails instead of inventing one.
/// [`WordPool::with_hard_fallback`] opts into a curated fallback list.
#[derive(Debug, Clone, Default)]
pub struct WordPool {
    items: HashMap<WordTier, Vec<ChallengeItem>>,
}

const EASY: &[(&str, &[&str], &str)] = &[
    ("CASA", &[], "Lugar donde vives con tu familia"),
    ("SOL", &[], "Brilla en el cielo durante el día"),
    ("PAN", &[], "Se compra en la panadería"),
    ("MESA", &[], "Mueble donde se come"),
    ("GATO", &[], "Animal que maúlla"),
    ("PERRO", &[], "El mejor amigo del hombre"),
    ("FLOR", &[], "Crece en el jardín y huele bien"),
    ("LUNA", &[], "Brilla en el cielo por la noche"),
    ("AGUA", &[], "La bebes cuando tienes sed"),
    ("MANO", &[], "Tiene cinco dedos"),
    ("LECHE", &[], "Bebida blanca que da la vaca"),
    ("SILLA", &[], "Sirve para sentarse"),
];

const MEDIUM: &[(&str, &[&str], &str)] = &[
    ("COCINA", &["T"], "Donde se preparan los alimentos"),
    ("VENTANA", &["S"], "Por ella entra la luz a la casa"),
    ("JARDIN", &["O"], "Espacio con plantas y flores"),
    ("ZAPATO", &["R"], "Se pone en el pie para caminar"),
    ("CAMINO", &["E"], "Por donde se va de un lugar a otro"),
    ("PLANTA", &["D"], "Necesita agua y sol para crecer"),
    ("ABUELO", &["N"], "El padre de tu padre"),
    ("MERCADO", &["L"], "Lugar donde se compran frutas y verduras"),
    ("PALOMA", &["S"], "Ave blanca símbolo de la paz"),
    ("RELOJ", &["A"], "Indica la hora"),
    ("FAMILIA", &["O"], "Padres, hijos y abuelos"),
    ("ESCUELA", &["R"], "Donde los niños aprenden"),
];

fn items(raw: &[(&str, &[&str], &str)]) -> Vec<ChallengeItem> {
    raw.iter()
        .map(|(target, distractors, hint)| ChallengeItem::new(target, distractors, hint))
        .collect()
}

impl WordPool {
    /// An empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// The bundled easy and medium lists.
    pub fn builtin() -> Self {
        Self::new()
            .with_items(WordTier::Easy, items(EASY))
            .with_items(WordTier::Medium, items(MEDIUM))
    }

    /// Add items to a tier.
    pub fn with_items(mut self, tier: WordTier, items: Vec<ChallengeItem>) -> Self {
        self.items.entry(tier).or_default().extend(items);
        self
    }

    /// Add fallback items for the hard tier.
    pub fn with_hard_fallback(self, items: Vec<ChallengeItem>) -> Self {
        self.with_items(WordTier::Hard, items)
    }

    /// Items available at `tier`.
    pub fn len(&self, tier: WordTier) -> usize {
        self.items.get(&tier).map_or(0, Vec::len)
    }

    /// Whether `tier` has no items.
    pub fn is_empty(&self, tier: WordTier) -> bool {
        self.len(tier) == 0
    }

    /// Draw uniformly from `tier`, skipping words in `recent`.
    ///
    /// If every item is recent, the exclusion is dropped for this draw.
    /// Returns `None` only when the tier has no items at all.
    pub fn draw<R: Rng + ?Sized>(
        &self,
        tier: WordTier,
        recent: &[String],
        rng: &mut R,
    ) -> Option<ChallengeItem> {
        let all = self.items.get(&tier)?;
        let recent: Vec<String> = recent.iter().map(|w| normalize_word(w)).collect();
        let fresh: Vec<&ChallengeItem> =
            all.iter().filter(|i| !recent.contains(&i.target)).collect();
        if fresh.is_empty() {
            tracing::debug!(%tier, "every pool item was played recently; reusing the pool");
            all.choose(rng).cloned()
        } else {
            fresh.choose(rng).map(|i| (*i).clone())
        }
    }
}
