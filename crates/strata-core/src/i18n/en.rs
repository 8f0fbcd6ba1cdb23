use super::TextKey;

pub(super) fn text(key: TextKey) -> Option<&'static str> {
    use TextKey::*;

    Some(match key {
        AppName => "Challenge Definition",
        AppSubtitle => "CSO AI: Digital Media, Data & Adtech Strategy.",
        FooterStep => "Step {current} of {total}",

        HistoryTitle => "Saved Strategy Sessions",
        HistoryEmpty => "No saved sessions found.",
        LabelLastModified => "Last Modified",
        ConfirmDelete => "Are you sure you want to delete this session?",
        NewSessionConfirm => "Start a new session? Unsaved progress will be lost.",
        SessionCreated => "New session {id} started.",
        SessionLoaded => "Session {id} loaded.",
        SessionDeleted => "Session {id} deleted.",

        HelpModalTitle => "CSO Assistant (DM 2)",
        HelpModalIntro => {
            "Hello. I am your AI Chief Strategy Officer, specialized in Digital Media, Adtech, and Data. I do not do tactics. I transform disorder into strategic kernels."
        }
        HelpTopicsHeader => "Help Topics",
        HelpOverviewQ => "What is DM 2. Challenge Definition?",
        HelpOverviewA => {
            "This tool is the mandatory starting point for New Business, Upsell, and Cross-sell. It acts as a CSO specializing in Media & Data, converting disordered inputs into a structured Rumelt Strategy Kernel."
        }
        HelpDiagnosisQ => "How do I complete the Diagnosis step?",
        HelpDiagnosisA => {
            "Client Name is mandatory. Select the Opportunity Type, Media Role, and Maturity. Optionally attach a file (PDF, DOCX, TXT) or paste text. Then run 'analyze' to let the AI deduce the core challenges."
        }
        HelpChallengeFormulationQ => "Understanding the Output (Rumelt)",
        HelpChallengeFormulationA => {
            "We use Rumelt's framework applied to Adtech:\n- **Diagnosis:** The root cause (e.g., Data signal loss).\n- **Guiding Policy:** The strategic approach (e.g., First-party data architecture).\nWe do NOT provide tactical solutions (banners, creatives) here."
        }
        HelpSmartPromptsQ => "What are the Smart Prompts?",
        HelpSmartPromptsA => {
            "These are not creative ideas. They are 'Strategic Investigation Avenues', directions for your team to explore regarding Data, Tech, and Media efficiency."
        }
        HelpExportQ => "How can I save or share my work?",
        HelpExportA => {
            "In the final \"Summary & Export\" step, you can review all the information from your session.\nUse 'export' to print the entire summary in Markdown format, or 'export --out <dir>' to save it as a .md file for easy sharing and future reference."
        }
        HelpAiGenerationQ => "How does AI generation work? What if I see errors?",
        HelpAiGenerationA => {
            "DM 2. Challenge Definition uses Google's Gemini AI to analyze your inputs and generate strategic insights and prompts based on Rumelt's framework.\nIf you encounter errors:\n- Ensure all required fields in the Diagnosis step are filled comprehensively.\n- Check your internet connection.\n- Try regenerating the content. If the issue persists, the AI service might be temporarily unavailable."
        }
        HelpNavigationQ => "How do I move between steps?",
        HelpNavigationA => {
            "Steps advance in order: Diagnosis, Challenge Definition, Strategic Avenues, Summary & Export.\nYou can always return to a previously completed step or the current step, but never jump ahead."
        }

        HeaderDiagnosis => "Phase 1: Initial Diagnosis",
        HeaderChallengeFormulation => "Phase 2: Challenge Definition",
        HeaderSmartPrompts => "Phase 3: Strategic Avenues",
        HeaderResults => "Phase 4: Summary & Export",
        HeaderProjectSetup => "Client & Context Setup",
        HeaderBusinessMarketContext => "Business & Market Context (AI Extracted)",
        HeaderProblemConsumerContext => "Problem, Context & Current Efforts (AI Extracted)",
        HeaderCulturalTension => "Cultural Tension (Context)",
        HeaderMarketOpportunity => "Market Opportunity (Adtech/Data)",
        HeaderConsumerInsight => "Consumer Insight (Context)",
        HeaderRumeltDiagnosis => "Rumelt's Diagnosis (The Core Challenge)",
        HeaderRumeltGuidingPolicy => "Rumelt's Guiding Policy (The Approach)",
        HeaderBehavioralJustification => "Behavioral Justification (Why it works)",
        HeaderKeyAssumptions => "Key Assumptions",
        HeaderRelevantMentalModels => "Relevant Mental Models / Rumelt's Sources of Power",
        HeaderGeneratedIdeationPrompts => "Strategic Avenues (Data, Tech, Media)",
        HeaderInformationSources => "Information Sources",
        HeaderDiagnosisSnapshot => "Diagnosis Input Snapshot",
        HeaderStrategicChallengeCore => "Strategic Challenge Kernel (Rumelt)",
        HeaderStrategicAlternatives => "3 Strategic Angles (Select One)",

        DescriptionDiagnosis => {
            "Provide client details and optional inputs. The AI will extract the context using your settings."
        }
        DescriptionChallengeFormulation => {
            "The AI CSO articulates 3 Strategic Angles (Challenger, Consultative, Mixed). Select the one that best fits."
        }
        DescriptionSmartPrompts => {
            "Identify avenues for investigation in Data, Tech, and Media efficiency to support the Guiding Policy."
        }
        DescriptionResults => {
            "Review your complete strategic formulation. You can print it or save it as a Markdown file."
        }

        LabelClientName => "Client Name (Mandatory)",
        LabelOpportunityType => "Opportunity Type",
        LabelMediaRole => "Expected Media Role",
        LabelDigitalMaturity => "Digital Maturity Level",
        LabelUploadBriefing => "Briefing / Inputs",
        LabelManualBriefing => "Manual Briefing / Raw Notes",
        LabelUploadImages => "Upload Screenshots (Max 5)",
        LabelCustomerType => "Target Customer Type / Persona",
        LabelMarketCategory => "Market / Category",
        LabelSectorIndustry => "Sector / Industry",
        LabelProductService => "Product or Service Name/Type",
        LabelBusinessChallenge => "The Business Challenge (What problem does the *company* face?)",
        LabelCustomerChallenge => {
            "The Customer Challenge (What problem does the *end-user* face?)"
        }
        LabelConsumerInvolvement => "Consumer Involvement Level",
        LabelFunnelStage => "Typical Funnel Stage for Target Interaction",
        LabelConsumerBarriers => "Key Consumer Barriers/Frictions",
        LabelCurrentStrategy => "Previous Efforts / Current Strategy (Auto-detected)",
        LabelOptionA => "Option A: Challenger",
        LabelOptionB => "Option B: Consultative",
        LabelOptionC => "Option C: Mixed / Synthesis",

        FileSelected => "Selected: {fileName}",
        FileParsing => "Parsing: {fileName}",

        MessageAnalyzingBriefing => "Analyzing Briefing...",
        MessageFormulatingChallenge => {
            "The AI CSO is designing 3 Strategic Angles (Media + Tech + Data)..."
        }
        MessageGeneratingPrompts => "Defining strategic investigation avenues...",

        ErrorGeneric => "An unknown error occurred.",
        ErrorChallengeNotFormulated => {
            "Please ensure Rumelt's Diagnosis and Guiding Policy are formulated before generating prompts."
        }
        ErrorDiagnosisNotComplete => {
            "Please complete the Client Name. Click 'Analyze Briefing' to extract the context from inputs or defaults."
        }
        ErrorMissingClientName => "Client Name is mandatory.",
        ErrorMissingBriefingSource => {
            "Add a manual briefing or attach a briefing file before analyzing."
        }
        ErrorDiagnosisFieldsMissing => {
            "Complete the following diagnosis fields before formulating the challenge: {fields}"
        }
        ErrorStepNotReached => "You can only return to the current step or one already visited.",
        ErrorActionInProgress => "Please wait until the current AI request finishes.",

        NoticeImageCapacity => "Maximum of {max} images reached. {name} was not added.",
        NoticeNotAnImage => "{name} is not a supported image file.",
        NoticeExtractionUnsupported => {
            "File selected. Note: Only PDF, DOCX and plain text support content auto-extraction. For others, the AI will rely on the filename and your dropdown choices."
        }
        NoticeExtractionFailed => "Could not extract text from {fileName}: {reason}",
        NoticeAutosaveFailed => "The session could not be saved: {reason}",
        NoticeAutosaveSkipped => "Not saved: a session is stored once it has a client name or a business challenge.",

        TextNotSet => "Not set",
        TextNotGenerated => "Not generated",
        TextNoPromptsGenerated => "No avenues generated yet.",
    })
}
