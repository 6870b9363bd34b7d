//! Prompt assembly for script generation

use crate::generate::GenerationRequest;
use genzen_common::model::MeditationType;

/// System role for the generation model
pub const SYSTEM_PROMPT: &str = "You are an expert meditation guide who creates \
personalized, calming meditation scripts. Your scripts are gentle, supportive, \
and designed to help people find inner peace and achieve their goals.";

/// Assemble the user prompt: structure, per-type guidance, customization,
/// and the pacing-marker instructions the synthesis step depends on
pub fn build_prompt(request: &GenerationRequest) -> String {
    let duration = request.duration;
    let kind = request.meditation_type;

    let mut prompt = format!(
        "Create a {duration}-minute {kind} meditation script.\n\
         \n\
         Structure the meditation with:\n\
         1. Opening/grounding (1-2 minutes)\n\
         2. Main practice ({} minutes)\n\
         3. Closing/integration (1-2 minutes)\n\
         \n\
         Use calming language, include proper pacing markers [PAUSE 3], [BREATHE], \
         and natural transitions.\n\
         Write in second person (you) and present tense.\n\
         Include specific timing guidance for the narrator.\n\
         Make the language gentle, supportive, and encouraging.\n",
        duration - 3
    );

    prompt.push_str(type_guidance(kind));

    if kind == MeditationType::Manifestation {
        if let Some(customization) = &request.customization {
            if let Some(goals) = &customization.goals {
                prompt.push_str(&format!("- Specific focus on: {}\n", goals));
            }
            if let Some(timeline) = &customization.timeline {
                prompt.push_str(&format!("- Timeline context: {}\n", timeline));
            }
            if let Some(category) = &customization.category {
                prompt.push_str(&format!("- Category: {}\n", category));
            }
            if let Some(situation) = &customization.current_situation {
                prompt.push_str(&format!("- Current situation: {}\n", situation));
            }
        }
    }

    prompt.push_str(
        "\nPlease respond with ONLY the meditation script text, no additional \
         formatting or explanations.\n\
         The script should be natural and flowing, suitable for text-to-speech \
         conversion.\n\
         Include pause markers like [PAUSE 3] for 3-second pauses, [BREATHE] for \
         breathing cues.\n",
    );

    prompt
}

fn type_guidance(kind: MeditationType) -> &'static str {
    match kind {
        MeditationType::Manifestation => {
            "\nFocus on manifestation techniques:\n\
             - Visualization of goals being achieved\n\
             - Positive affirmations about success\n\
             - Feeling emotions of already having what you desire\n\
             - Clear mental imagery of the desired outcome\n"
        }
        MeditationType::Relaxation => {
            "\nFocus on relaxation techniques:\n\
             - Progressive muscle relaxation\n\
             - Deep breathing exercises\n\
             - Release of tension and stress\n\
             - Calming imagery of peaceful places\n\
             - Body scan for complete relaxation\n"
        }
        MeditationType::Sleep => {
            "\nFocus on sleep preparation:\n\
             - Gentle body relaxation from head to toe\n\
             - Slow, rhythmic breathing patterns\n\
             - Peaceful, dreamy imagery\n\
             - Letting go of the day's concerns\n\
             - Transition to restful sleep\n"
        }
        MeditationType::Visualization => {
            "\nFocus on guided imagery:\n\
             - Vivid sensory descriptions\n\
             - Engaging all five senses\n\
             - Journey through beautiful, peaceful environments\n\
             - Clear, detailed visual scenes\n\
             - Immersive experience\n"
        }
        MeditationType::Affirmations => {
            "\nFocus on positive affirmations:\n\
             - Self-empowering statements\n\
             - Building confidence and self-worth\n\
             - Reinforcing positive beliefs\n\
             - Personal strength and capability\n\
             - Overcoming limiting beliefs\n"
        }
        MeditationType::Mindfulness => {
            "\nFocus on present moment awareness:\n\
             - Attention to breath and body sensations\n\
             - Observing thoughts without judgment\n\
             - Awareness of the present moment\n\
             - Gentle return to focus when mind wanders\n\
             - Cultivation of inner peace\n"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genzen_common::model::Customization;

    #[test]
    fn test_prompt_carries_structure_and_markers() {
        let prompt = build_prompt(&GenerationRequest {
            meditation_type: MeditationType::Sleep,
            duration: 20,
            customization: None,
        });

        assert!(prompt.contains("Create a 20-minute sleep meditation script."));
        assert!(prompt.contains("Main practice (17 minutes)"));
        assert!(prompt.contains("[PAUSE 3]"));
        assert!(prompt.contains("[BREATHE]"));
        assert!(prompt.contains("sleep preparation"));
    }

    #[test]
    fn test_manifestation_customization_included() {
        let prompt = build_prompt(&GenerationRequest {
            meditation_type: MeditationType::Manifestation,
            duration: 15,
            customization: Some(Customization {
                goals: Some("open my own studio".to_string()),
                timeline: Some("within a year".to_string()),
                category: Some("business".to_string()),
                current_situation: None,
            }),
        });

        assert!(prompt.contains("manifestation techniques"));
        assert!(prompt.contains("Specific focus on: open my own studio"));
        assert!(prompt.contains("Timeline context: within a year"));
        assert!(prompt.contains("Category: business"));
    }

    #[test]
    fn test_customization_ignored_for_other_types() {
        let prompt = build_prompt(&GenerationRequest {
            meditation_type: MeditationType::Relaxation,
            duration: 10,
            customization: Some(Customization {
                goals: Some("anything".to_string()),
                ..Default::default()
            }),
        });

        assert!(!prompt.contains("Specific focus on"));
        assert!(prompt.contains("relaxation techniques"));
    }

    #[test]
    fn test_every_type_has_guidance() {
        for kind in MeditationType::ALL {
            let prompt = build_prompt(&GenerationRequest {
                meditation_type: kind,
                duration: 10,
                customization: None,
            });
            assert!(prompt.contains("Focus on"), "no guidance for {}", kind);
        }
    }
}
