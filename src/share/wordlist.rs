//! Embedded word list for share-code generation
//!
//! 256 short, unambiguous, lowercase English words. Generation draws four
//! words from this list; validation deliberately does NOT require membership
//! so codes produced by other clients with a larger list still join.

/// Words available to the share-code generator
pub const WORDS: &[&str] = &[
    "acid", "acorn", "actor", "adult", "agent", "alarm", "album", "alley",
    "amber", "anchor", "angle", "ankle", "apple", "apron", "arrow", "aspen",
    "atlas", "attic", "autumn", "badge", "bagel", "banjo", "barn", "basil",
    "basket", "beach", "bean", "bear", "beet", "bell", "bench", "berry",
    "birch", "bison", "blade", "blanket", "blossom", "bolt", "bonfire", "book",
    "boot", "bottle", "box", "brick", "bridge", "brook", "broom", "bucket",
    "bugle", "butter", "cabin", "cactus", "camel", "candle", "canoe", "canyon",
    "carbon", "cargo", "carrot", "castle", "cedar", "chair", "chalk", "cherry",
    "chess", "chime", "cider", "cinder", "circle", "citrus", "clay", "cliff",
    "clock", "cloud", "clover", "coast", "cobalt", "coconut", "comet", "compass",
    "copper", "coral", "corn", "cotton", "cradle", "crane", "crater", "cricket",
    "crystal", "cypress", "daisy", "dawn", "delta", "desk", "dome", "donkey",
    "dune", "eagle", "easel", "echo", "elbow", "elder", "ember", "engine",
    "fable", "falcon", "feather", "fennel", "fern", "fiddle", "field", "flint",
    "flute", "forest", "fossil", "fox", "frost", "garden", "garlic", "gecko",
    "geyser", "ginger", "glacier", "glade", "goose", "granite", "grape", "grove",
    "hammer", "harbor", "harp", "hazel", "heron", "hill", "honey", "hoof",
    "horizon", "ibis", "icicle", "indigo", "iris", "iron", "island", "ivory",
    "jacket", "jade", "jasper", "jigsaw", "juniper", "kayak", "kettle", "kiwi",
    "ladder", "lagoon", "lake", "lantern", "laurel", "lava", "lemon", "lichen",
    "lily", "linen", "lion", "lotus", "lumber", "lynx", "magnet", "mango",
    "maple", "marble", "meadow", "melon", "mesa", "mint", "mirror", "moose",
    "moss", "moth", "mountain", "mule", "mural", "needle", "nest", "nickel",
    "north", "nutmeg", "oak", "oasis", "ocean", "olive", "onion", "opal",
    "orchard", "orchid", "otter", "owl", "paddle", "pagoda", "palm", "panda",
    "paper", "parrot", "peach", "pearl", "pebble", "pelican", "pepper", "pine",
    "planet", "plum", "pond", "poplar", "prairie", "prism", "pumpkin", "quail",
    "quartz", "quill", "rabbit", "raft", "rain", "raven", "reed", "ridge",
    "river", "robin", "rocket", "rose", "rye", "saddle", "sage", "salmon",
    "sand", "sapphire", "seal", "shadow", "shell", "silver", "sled", "slope",
    "spark", "sphere", "spruce", "squash", "stone", "storm", "summit", "sunset",
    "swan", "thistle", "thunder", "tiger", "timber", "topaz", "trail", "tulip",
];
