//! Prompt construction for summaries and direct answers

use crate::failover::ModelTiers;
use crate::providers::GenerationParams;
use crate::request::{Language, Length, Mode, SummaryRequest};
use crate::wiki::Article;

pub const TEMPERATURE: f32 = 0.3;

/// Which model tier the prompt is meant for first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelHint
{   Large
  , Small
}

impl ModelHint
{   pub fn model_name(self, tiers: &ModelTiers) -> &str
    {   match self
        {   ModelHint::Large => &tiers.large
          , ModelHint::Small => &tiers.small
        }
    }
}

/// Prompt text plus the parameters to send it with.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt
{   pub text: String
  , pub model_hint: ModelHint
  , pub params: GenerationParams
}

fn length_instruction(length: Length) -> String
{   let (low, high) = length.word_range();
    format!("between {} and {} words", low, high)
}

fn language_instruction(language: Language) -> String
{   format!("Write the entire answer in {}.", language.name())
}

/// Localized focus directive, `None` for general mode.
pub fn mode_instruction(mode: Mode, language: Language) -> Option<&'static str>
{   use Language::*;
    use Mode::*;

    let text = match (mode, language)
    {   (General, _) => return None

      , (Historical, En) => "\
HISTORICAL FOCUS:
- Follow the chronology of events
- Give the key dates and periods
- Explain the causes, consequences and lasting impact"
      , (Historical, Fr) => "\
ORIENTATION HISTORIQUE :
- Suivez la chronologie des événements
- Donnez les dates et périodes clés
- Expliquez les causes, les conséquences et l'impact durable"
      , (Historical, Es) => "\
ENFOQUE HISTÓRICO:
- Sigue la cronología de los acontecimientos
- Indica las fechas y los periodos clave
- Explica las causas, las consecuencias y el impacto duradero"

      , (Scientific, En) => "\
SCIENTIFIC FOCUS:
- Define the key concepts precisely
- Present the main theories and discoveries
- Describe the methodology and the evidence"
      , (Scientific, Fr) => "\
ORIENTATION SCIENTIFIQUE :
- Définissez précisément les concepts clés
- Présentez les principales théories et découvertes
- Décrivez la méthodologie et les preuves"
      , (Scientific, Es) => "\
ENFOQUE CIENTÍFICO:
- Define con precisión los conceptos clave
- Presenta las principales teorías y descubrimientos
- Describe la metodología y las pruebas"

      , (Biographical, En) => "\
BIOGRAPHICAL FOCUS:
- Trace the main events of the person's life
- Highlight the milestones and achievements
- Mention the influences and the legacy"
      , (Biographical, Fr) => "\
ORIENTATION BIOGRAPHIQUE :
- Retracez les grandes étapes de la vie de la personne
- Mettez en avant les jalons et les réalisations
- Mentionnez les influences et l'héritage"
      , (Biographical, Es) => "\
ENFOQUE BIOGRÁFICO:
- Recorre los principales acontecimientos de la vida de la persona
- Destaca los hitos y los logros
- Menciona las influencias y el legado"

      , (Educational, En) => "\
EDUCATIONAL FOCUS:
- Use plain language a student can follow
- Explain every technical term you use
- Build up from the basics with simple examples"
      , (Educational, Fr) => "\
ORIENTATION PÉDAGOGIQUE :
- Employez un langage simple accessible à un élève
- Expliquez chaque terme technique utilisé
- Partez des bases avec des exemples simples"
      , (Educational, Es) => "\
ENFOQUE EDUCATIVO:
- Usa un lenguaje sencillo que un estudiante pueda seguir
- Explica cada término técnico que utilices
- Parte de lo básico con ejemplos sencillos"

      , (Cultural, En) => "\
CULTURAL FOCUS:
- Describe the social and artistic impact
- Place the subject in its cultural context
- Mention traditions, works and influence on society"
      , (Cultural, Fr) => "\
ORIENTATION CULTURELLE :
- Décrivez l'impact social et artistique
- Situez le sujet dans son contexte culturel
- Mentionnez les traditions, les œuvres et l'influence sur la société"
      , (Cultural, Es) => "\
ENFOQUE CULTURAL:
- Describe el impacto social y artístico
- Sitúa el tema en su contexto cultural
- Menciona las tradiciones, las obras y la influencia en la sociedad"

      , (KeyFacts, En) => "\
KEY FACTS FORMAT:
- Give only the essential facts, one per line
- Keep each point short, as revision notes
- Start each point with a dash"
      , (KeyFacts, Fr) => "\
FORMAT POINTS CLÉS :
- Donnez uniquement les faits essentiels, un par ligne
- Gardez chaque point court, comme des fiches de révision
- Commencez chaque point par un tiret"
      , (KeyFacts, Es) => "\
FORMATO DATOS CLAVE:
- Da solo los datos esenciales, uno por línea
- Mantén cada punto breve, como apuntes de repaso
- Empieza cada punto con un guion"
    };
    Some(text)
}

const FORMAT_RULES: &str = "\
FORMATTING RULES:
- Plain text only, no markdown: never use **, * or #
- Separate paragraphs with a single blank line
- Do not add a title or a heading";

fn params_for(length: Length) -> GenerationParams
{   GenerationParams
    {   temperature: TEMPERATURE
      , max_tokens: length.max_tokens()
    }
}

fn focus_block(request: &SummaryRequest) -> String
{   match mode_instruction(request.mode(), request.language())
    {   Some(directive) => format!("\n{}\n", directive)
      , None => String::new()
    }
}

/// Prompt asking for a summary of a located article.
pub fn summary_prompt(request: &SummaryRequest, article: &Article) -> Prompt
{   let text = format!(
"You are an expert at summarizing encyclopedic articles.

Summarize the Wikipedia article \"{title}\" below in {words}.
{language}
{focus}
{rules}

ARTICLE:
{content}

SUMMARY ({words}):",
      title = article.title,
      words = length_instruction(request.length()),
      language = language_instruction(request.language()),
      focus = focus_block(request),
      rules = FORMAT_RULES,
      content = article.content,
    );

    Prompt
    {   text
      , model_hint: ModelHint::Large
      , params: params_for(request.length())
    }
}

/// Prompt asking the model to explain a theme without source text.
pub fn direct_prompt(request: &SummaryRequest) -> Prompt
{   let text = format!(
"You are an expert who explains any subject clearly and accurately.

Explain the subject \"{theme}\" in {words}.
No encyclopedia article was found, rely on your own knowledge and stay factual.
{language}
{focus}
{rules}

EXPLANATION ({words}):",
      theme = request.theme(),
      words = length_instruction(request.length()),
      language = language_instruction(request.language()),
      focus = focus_block(request),
      rules = FORMAT_RULES,
    );

    Prompt
    {   text
      , model_hint: ModelHint::Large
      , params: params_for(request.length())
    }
}
