use super::TextKey;

pub(super) fn text(key: TextKey) -> Option<&'static str> {
    use TextKey::*;

    Some(match key {
        AppName => "Definición del Reto",
        AppSubtitle => "CSO AI: Estrategia de Medios, Data y Adtech.",
        FooterStep => "Paso {current} de {total}",

        HistoryTitle => "Sesiones Guardadas",
        HistoryEmpty => "No se encontraron sesiones guardadas.",
        LabelLastModified => "Última Modificación",
        ConfirmDelete => "¿Seguro que quieres borrar esta sesión?",
        NewSessionConfirm => "¿Iniciar nueva sesión? Se perderá el progreso no guardado.",
        SessionCreated => "Nueva sesión {id} iniciada.",
        SessionLoaded => "Sesión {id} cargada.",
        SessionDeleted => "Sesión {id} borrada.",

        HelpModalTitle => "Asistente CSO (DM 2)",
        HelpModalIntro => {
            "¡Hola! Soy tu Chief Strategy Officer (IA) especializado en Digital Media, Adtech y Data. No hago tácticas. Transformo el caos en núcleos estratégicos."
        }
        HelpTopicsHeader => "Temas de Ayuda",
        HelpOverviewQ => "¿Qué es DM 2. Definición del Reto?",
        HelpOverviewA => {
            "Es el paso obligatorio de arranque para New Business, Upsell y Cross-sell. Actúa como un CSO experto en Medios y Data, convirtiendo inputs desordenados en una estrategia sólida basada en Rumelt."
        }
        HelpDiagnosisQ => "¿Cómo completo el paso de Diagnóstico?",
        HelpDiagnosisA => {
            "El Nombre del Cliente es obligatorio. Selecciona Tipo de Oportunidad, Rol de Medios y Madurez. Opcionalmente adjunta un archivo (PDF, DOCX, TXT) o pega texto. Luego ejecuta 'analyze' para que la IA deduzca los retos."
        }
        HelpChallengeFormulationQ => "Entendiendo el Output (Rumelt)",
        HelpChallengeFormulationA => {
            "Usamos el marco de Rumelt aplicado a Adtech:\n- **Diagnóstico:** La causa raíz (ej. pérdida de señal de Data).\n- **Política Guía:** El enfoque estratégico (ej. Soberanía de First-party data).\nNO damos soluciones tácticas (banners, creatividades) aquí."
        }
        HelpSmartPromptsQ => "¿Qué son los Prompts Inteligentes?",
        HelpSmartPromptsA => {
            "No son ideas creativas. Son 'Vías de Investigación Estratégica' para que tu equipo explore temas de Data, Tecnología y Eficiencia de Medios."
        }
        HelpExportQ => "¿Cómo puedo guardar o compartir mi trabajo?",
        HelpExportA => {
            "En el paso final \"Resumen y Exportación\", puedes revisar toda la información de tu sesión.\nUsa 'export' para imprimir el resumen completo en formato Markdown, o 'export --out <dir>' para guardarlo como archivo .md y compartirlo fácilmente."
        }
        HelpAiGenerationQ => "¿Cómo funciona la generación por IA? ¿Qué pasa si veo errores?",
        HelpAiGenerationA => {
            "DM 2. Definición del Reto utiliza la IA Gemini de Google para analizar tus entradas y generar insights estratégicos y prompts basados en el marco de Rumelt.\nSi encuentras errores:\n- Asegúrate de que todos los campos requeridos en el paso de Diagnóstico estén completos.\n- Verifica tu conexión a internet.\n- Intenta regenerar el contenido. Si el problema persiste, el servicio de IA podría estar temporalmente no disponible."
        }
        HelpNavigationQ => "¿Cómo me muevo entre los pasos?",
        HelpNavigationA => {
            "Los pasos avanzan en orden: Diagnóstico, Definición del Reto, Vías Estratégicas, Resumen y Exportación.\nSiempre puedes volver a un paso ya completado o al paso actual, pero nunca saltar hacia adelante."
        }

        HeaderDiagnosis => "Fase 1: Diagnóstico Inicial",
        HeaderChallengeFormulation => "Fase 2: Definición del Reto",
        HeaderSmartPrompts => "Fase 3: Vías Estratégicas",
        HeaderResults => "Fase 4: Resumen y Exportación",
        HeaderProjectSetup => "Cliente y Contexto",
        HeaderBusinessMarketContext => "Contexto de Negocio (Extraído por IA)",
        HeaderProblemConsumerContext => "Contexto Problema, Consumidor y Esfuerzos Previos",
        HeaderCulturalTension => "Tensión Cultural (Contexto)",
        HeaderMarketOpportunity => "Oportunidad de Mercado (Adtech/Data)",
        HeaderConsumerInsight => "Insight del Consumidor (Contexto)",
        HeaderRumeltDiagnosis => "Diagnóstico de Rumelt (El Reto Central)",
        HeaderRumeltGuidingPolicy => "Política Guía de Rumelt (El Enfoque)",
        HeaderBehavioralJustification => "Justificación Conductual (Por qué funciona)",
        HeaderKeyAssumptions => "Suposiciones Clave",
        HeaderRelevantMentalModels => "Modelos Mentales Relevantes / Fuentes de Poder de Rumelt",
        HeaderGeneratedIdeationPrompts => "Vías Estratégicas (Data, Tech, Media)",
        HeaderInformationSources => "Fuentes de Información",
        HeaderDiagnosisSnapshot => "Resumen del Diagnóstico (Entrada)",
        HeaderStrategicChallengeCore => "Núcleo del Reto Estratégico (Rumelt)",
        HeaderStrategicAlternatives => "3 Ángulos Estratégicos (Selecciona Uno)",

        DescriptionDiagnosis => {
            "Aporta detalles del cliente y opciones obligatorias. El CSO IA extraerá el contexto de estos datos y archivos opcionales."
        }
        DescriptionChallengeFormulation => {
            "El CSO IA diseña 3 Ángulos (Challenger, Consultivo, Mixto). Selecciona el que mejor encaje."
        }
        DescriptionSmartPrompts => {
            "Identifica vías de investigación en Data, Tech y Eficiencia de Medios para apoyar la Política Guía."
        }
        DescriptionResults => {
            "Revisa tu formulación estratégica completa. Puedes imprimirla o guardarla como archivo Markdown."
        }

        LabelClientName => "Nombre del Cliente (Obligatorio)",
        LabelOpportunityType => "Tipo de Oportunidad",
        LabelMediaRole => "Rol Esperado de Medios",
        LabelDigitalMaturity => "Nivel de Madurez Digital",
        LabelUploadBriefing => "Briefing / Entradas",
        LabelManualBriefing => "Briefing Manual / Notas Crudas",
        LabelUploadImages => "Subir Pantallazos (Máx 5)",
        LabelCustomerType => "Tipo de Cliente / Persona Objetivo",
        LabelMarketCategory => "Mercado / Categoría",
        LabelSectorIndustry => "Sector / Industria",
        LabelProductService => "Nombre/Tipo de Producto o Servicio",
        LabelBusinessChallenge => "El Reto de Negocio (¿Qué problema enfrenta la *empresa*?)",
        LabelCustomerChallenge => {
            "El Reto del Cliente (¿Qué problema enfrenta el *usuario final*?)"
        }
        LabelConsumerInvolvement => "Nivel de Implicación del Consumidor",
        LabelFunnelStage => "Etapa Típica del Embudo para Interacción Objetivo",
        LabelConsumerBarriers => "Barreras/Fricciones Clave del Consumidor",
        LabelCurrentStrategy => "Esfuerzos Previos / Estrategia Actual (Auto-detectado)",
        LabelOptionA => "Opción A: Challenger",
        LabelOptionB => "Opción B: Consultiva",
        LabelOptionC => "Opción C: Mixta / Síntesis",

        FileSelected => "Seleccionado: {fileName}",
        FileParsing => "Analizando: {fileName}",

        MessageAnalyzingBriefing => "Analizando briefing...",
        MessageFormulatingChallenge => {
            "El CSO IA está diseñando 3 Ángulos Estratégicos (Media + Tech + Data)..."
        }
        MessageGeneratingPrompts => "Definiendo vías de investigación estratégica...",

        ErrorGeneric => "Ocurrió un error desconocido.",
        ErrorChallengeNotFormulated => {
            "Asegúrate de que el Diagnóstico y la Política Guía de Rumelt estén formulados antes de generar prompts."
        }
        ErrorDiagnosisNotComplete => {
            "Por favor, completa Nombre Cliente. Pulsa 'Analizar Briefing' para extraer el contexto de los inputs o valores por defecto."
        }
        ErrorMissingClientName => "El Nombre del Cliente es obligatorio.",
        ErrorMissingBriefingSource => {
            "Añade un briefing manual o adjunta un archivo de briefing antes de analizar."
        }
        ErrorDiagnosisFieldsMissing => {
            "Completa los siguientes campos del diagnóstico antes de formular el reto: {fields}"
        }
        ErrorStepNotReached => "Solo puedes volver al paso actual o a uno ya visitado.",
        ErrorActionInProgress => "Espera a que termine la petición de IA en curso.",

        NoticeImageCapacity => "Máximo de {max} imágenes alcanzado. {name} no se ha añadido.",
        NoticeNotAnImage => "{name} no es un archivo de imagen compatible.",
        NoticeExtractionUnsupported => {
            "Archivo seleccionado. Nota: Solo PDF, DOCX y texto plano permiten auto-extracción de texto. Para otros formatos, la IA usará el nombre del archivo y tus selecciones."
        }
        NoticeExtractionFailed => "No se pudo extraer texto de {fileName}: {reason}",
        NoticeAutosaveFailed => "No se pudo guardar la sesión: {reason}",
        NoticeAutosaveSkipped => "No guardado: la sesión se guarda cuando tiene nombre de cliente o reto de negocio.",

        TextNotSet => "No establecido",
        TextNotGenerated => "No generado",
        TextNoPromptsGenerated => "Aún no se han generado vías.",
    })
}
