//! # Stage Catalog
//!
//! The immutable, ordered definition of the interview. Catalog order defines
//! interview order; stage ids are unique within a catalog.
//!
//! A catalog is validated once at construction and never mutated afterwards.
//! Lookup is by index ([`StageCatalog::stage_at`]) or by id
//! ([`StageCatalog::index_of`]) through an interned `BTreeMap`.

use crate::primitives::CLOSING_STAGE_ID;
use crate::types::{StageId, TriageError, TriageStage};
use std::collections::BTreeMap;

// =============================================================================
// STAGE CATALOG
// =============================================================================

/// Ordered, validated collection of [`TriageStage`] definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageCatalog {
    stages: Vec<TriageStage>,
    index: BTreeMap<StageId, usize>,
}

impl StageCatalog {
    /// Build a catalog from an ordered stage list.
    ///
    /// Fails with [`TriageError::InvalidCatalog`] when the list is empty,
    /// when two stages share an id, or when a stage id collides with the
    /// terminal sentinel.
    pub fn new(stages: Vec<TriageStage>) -> Result<Self, TriageError> {
        if stages.is_empty() {
            return Err(TriageError::InvalidCatalog(
                "catalog must contain at least one stage".to_string(),
            ));
        }

        let mut index = BTreeMap::new();
        for (i, stage) in stages.iter().enumerate() {
            if stage.id.as_str() == CLOSING_STAGE_ID {
                return Err(TriageError::InvalidCatalog(format!(
                    "stage id '{}' is reserved for the closing sentinel",
                    CLOSING_STAGE_ID
                )));
            }
            if index.insert(stage.id.clone(), i).is_some() {
                return Err(TriageError::InvalidCatalog(format!(
                    "duplicate stage id: {}",
                    stage.id
                )));
            }
        }

        Ok(Self { stages, index })
    }

    /// Number of stages in the catalog.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Stage at `index`, or [`TriageError::OutOfRange`] outside
    /// `[0, stage_count())`.
    pub fn stage_at(&self, index: usize) -> Result<&TriageStage, TriageError> {
        self.stages.get(index).ok_or(TriageError::OutOfRange(index))
    }

    /// Catalog position of the stage with the given id, or
    /// [`TriageError::UnknownStage`].
    pub fn index_of(&self, id: &StageId) -> Result<usize, TriageError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| TriageError::UnknownStage(id.as_str().to_string()))
    }

    /// Whether the catalog defines a stage with the given id.
    #[must_use]
    pub fn contains(&self, id: &StageId) -> bool {
        self.index.contains_key(id)
    }

    /// Whether `id` may appear on a message: a catalog stage id or the
    /// terminal sentinel used by the closing of a finished interview.
    #[must_use]
    pub fn is_valid_message_stage(&self, id: &StageId) -> bool {
        self.contains(id) || id.as_str() == CLOSING_STAGE_ID
    }

    /// Iterate the stages in interview order.
    pub fn stages(&self) -> impl Iterator<Item = &TriageStage> {
        self.stages.iter()
    }

    /// The built-in Nôa Esperanza intake script: acolhimento, consentimento,
    /// queixas, história indiciária, síntese e encaminhamento.
    #[must_use]
    pub fn noa_default() -> Self {
        Self::from_validated(vec![
            TriageStage {
                id: StageId::new("acolhimento"),
                label: "Acolhimento".to_string(),
                prompt: "Olá! Eu sou Nôa Esperanza e vou conduzir a sua triagem clínica \
                         inicial. Antes de começarmos, pode me contar como prefere ser \
                         chamada?"
                    .to_string(),
                description: "Apresentação inicial, construção de vínculo e identificação \
                              de prioridades imediatas."
                    .to_string(),
                follow_ups: vec![
                    "Existe algo urgente ou que precise de atenção imediata neste momento?"
                        .to_string(),
                    "Há algum limite ou necessidade especial que devo considerar durante \
                     nossa conversa?"
                        .to_string(),
                ],
                exit_message: Some(
                    "Perfeito, obrigado por compartilhar essas informações iniciais."
                        .to_string(),
                ),
                suggestions: Vec::new(),
                focus_topics: Vec::new(),
                requires_consent: false,
            },
            TriageStage {
                id: StageId::new("consentimento"),
                label: "Consentimento".to_string(),
                prompt: "Para continuarmos, preciso do seu consentimento para registrar as \
                         informações desta triagem no seu prontuário digital. Podemos \
                         prosseguir?"
                    .to_string(),
                description: "Consentimento explícito para a coleta e registro dos dados \
                              da triagem."
                    .to_string(),
                follow_ups: Vec::new(),
                exit_message: Some(
                    "Tudo bem, a triagem foi encerrada e nenhuma informação será \
                     registrada. Quando quiser, podemos recomeçar."
                        .to_string(),
                ),
                suggestions: vec!["Sim".to_string(), "Não".to_string()],
                focus_topics: Vec::new(),
                requires_consent: true,
            },
            TriageStage {
                id: StageId::new("queixas"),
                label: "Queixas Principais".to_string(),
                prompt: "Conte-me quais questões, sintomas ou desconfortos estão presentes \
                         e merecem nossa atenção neste momento."
                    .to_string(),
                description: "Mapeamento das queixas principais e secundárias, \
                              identificando intensidade, frequência e impacto."
                    .to_string(),
                follow_ups: vec![
                    "Há mais alguma queixa ou sintoma que gostaria de registrar?".to_string(),
                    "Percebe algo que agrave ou alivie essas queixas?".to_string(),
                ],
                exit_message: Some(
                    "Anotei as queixas mencionadas. Agora vamos explorar a história dessas \
                     questões para compreender como surgiram."
                        .to_string(),
                ),
                suggestions: vec![
                    "Dor abdominal".to_string(),
                    "Cefaleia persistente".to_string(),
                    "Insônia".to_string(),
                    "Ansiedade".to_string(),
                    "Fadiga crônica".to_string(),
                    "Alterações digestivas".to_string(),
                    "Desconforto torácico".to_string(),
                    "Oscilações de humor".to_string(),
                ],
                focus_topics: Vec::new(),
                requires_consent: false,
            },
            TriageStage {
                id: StageId::new("historia-indiciaria"),
                label: "História Indiciária".to_string(),
                prompt: "Vamos aprofundar um pouco: quando essas questões começaram e como \
                         evoluíram até aqui?"
                    .to_string(),
                description: "Exploração da linha do tempo, gatilhos, hábitos e interações \
                              com outros elementos da vida."
                    .to_string(),
                follow_ups: vec![
                    "Que situações costumam desencadear ou intensificar os sintomas?"
                        .to_string(),
                    "Há sinais associados que vale comentar (como alterações de sono, \
                     alimentação ou humor)?"
                        .to_string(),
                ],
                exit_message: Some(
                    "Obrigado pelos detalhes. Já tenho uma boa visão da sua história e \
                     podemos partir para a síntese inicial."
                        .to_string(),
                ),
                suggestions: Vec::new(),
                focus_topics: vec![
                    "Início dos sintomas".to_string(),
                    "Episódios marcantes".to_string(),
                    "Fatores de alívio".to_string(),
                    "Fatores de piora".to_string(),
                    "Medicações ou terapias em curso".to_string(),
                    "Impacto no cotidiano".to_string(),
                    "Sono e recuperação".to_string(),
                    "Aspectos emocionais associados".to_string(),
                ],
                requires_consent: false,
            },
            TriageStage {
                id: StageId::new("sintese-encaminhamento"),
                label: "Síntese e Encaminhamento".to_string(),
                prompt: "Com base no que você compartilhou, vou preparar uma síntese \
                         clínica inicial para orientar os próximos passos. Há algo mais \
                         que deseje acrescentar antes de concluirmos esta triagem?"
                    .to_string(),
                description: "Síntese preliminar e alinhamento das ações subsequentes da \
                              jornada clínica."
                    .to_string(),
                follow_ups: Vec::new(),
                exit_message: Some(
                    "Triagem concluída. Registrarei a síntese no seu prontuário digital e \
                     encaminharei as orientações necessárias."
                        .to_string(),
                ),
                suggestions: Vec::new(),
                focus_topics: Vec::new(),
                requires_consent: false,
            },
        ])
    }

    /// Construct without validation. Callers guarantee non-empty stages with
    /// unique ids (post-validation in [`Self::new`], literal ids in
    /// [`Self::noa_default`]).
    fn from_validated(stages: Vec<TriageStage>) -> Self {
        let index = stages
            .iter()
            .enumerate()
            .map(|(i, stage)| (stage.id.clone(), i))
            .collect();
        Self { stages, index }
    }
}

// =============================================================================
// TESTS
// =============================================================================
